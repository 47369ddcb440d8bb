use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use reqwest::Url;

use budgetlog_client::{
    BulkAction, BulkActionResponse, ClientConfig, Error, HtmlPage, HttpClient, JsonFileStorage,
    Page, TransactionId, TransactionsPage, setup_logging,
};

/// Manage the budgetlog transaction selection from the command line.
///
/// The selection is kept in a JSON file between runs, the same way the
/// browser keeps it in local storage between page loads.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON file the selection is stored in.
    #[arg(long, default_value = "selection.json")]
    storage: PathBuf,

    /// URL of the page being viewed, e.g.,
    /// `https://budget.example.com/transactions/?type=expense`.
    #[arg(long)]
    page_url: String,

    /// Read the page from this HTML file instead of fetching it.
    #[arg(long)]
    html_file: Option<PathBuf>,

    /// Append debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current selection.
    Show,
    /// Check or uncheck a transaction.
    Toggle {
        /// The transaction's ID.
        id: String,
        /// Uncheck the transaction instead of checking it.
        #[arg(long)]
        unchecked: bool,
    },
    /// Select every transaction on the page.
    SelectPage,
    /// Select every transaction matching the page's filter.
    SelectAll,
    /// Clear the selection.
    Clear,
    /// Apply a bulk action to the selection.
    Submit {
        #[command(subcommand)]
        action: ActionArg,
        /// Where to save a downloaded file. Defaults to the name the server
        /// suggests.
        #[arg(long, global = true)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum ActionArg {
    /// Delete the selected transactions.
    Delete,
    /// Download the selected transactions as CSV.
    ExportCsv,
    /// Add a tag to the selected transactions.
    AssignTag { tag_id: i64 },
    /// Remove a tag from the selected transactions.
    RemoveTag { tag_id: i64 },
    /// Change the category of the selected transactions.
    ChangeCategory { category_id: i64 },
    /// Move the selected transactions to another book.
    MoveToBook { book_id: i64 },
}

impl From<ActionArg> for BulkAction {
    fn from(value: ActionArg) -> Self {
        match value {
            ActionArg::Delete => BulkAction::Delete,
            ActionArg::ExportCsv => BulkAction::ExportCsv,
            ActionArg::AssignTag { tag_id } => BulkAction::AssignTag(tag_id),
            ActionArg::RemoveTag { tag_id } => BulkAction::RemoveTag(tag_id),
            ActionArg::ChangeCategory { category_id } => BulkAction::ChangeCategory(category_id),
            ActionArg::MoveToBook { book_id } => BulkAction::MoveToBook(book_id),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(args.log_file.as_deref()) {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let config = ClientConfig::default();
    let client = HttpClient::new(&config)?;

    let page_url =
        Url::parse(&args.page_url).map_err(|_| Error::InvalidUrl(args.page_url.clone()))?;
    let page = match &args.html_file {
        Some(path) => HtmlPage::read_file(page_url, path)?,
        None => client.fetch_page(&page_url).await?,
    };

    let mut storage = JsonFileStorage::open(&args.storage);
    let mut page = TransactionsPage::on_load(&mut storage, page, &config);

    match args.command {
        Command::Show => {}
        Command::Toggle { id, unchecked } => {
            page.on_checkbox_change(TransactionId::new(&id)?, !unchecked);
        }
        Command::SelectPage => page.selection_mut().select_all_on_page(true),
        Command::SelectAll => {
            let added = page.on_select_all_click(true, &client).await?;
            println!("Selected {added} more transactions matching the filter.");
        }
        Command::Clear => page.selection_mut().clear(),
        Command::Submit { action, output } => {
            let current_url = page.selection().page().url().clone();
            let response = page.on_bulk_action(&client, action.into()).await?;
            handle_response(response, &current_url, output)?;
        }
    }

    print_selection(&page);
    Ok(())
}

fn handle_response(
    response: BulkActionResponse,
    current_url: &Url,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    if let Some(target) = response.redirect_target(current_url) {
        println!("Done. Continue at {target}");
        return Ok(());
    }

    if let Some(path) = response.save_download(output.as_deref())? {
        println!("Saved download to {}", path.display());
    }

    Ok(())
}

fn print_selection(page: &TransactionsPage<&mut JsonFileStorage, HtmlPage>) {
    let selection = page.selection().selection();

    if selection.is_empty() {
        println!("No transactions selected.");
    } else {
        println!(
            "{} transactions selected: {}",
            selection.len(),
            selection.to_comma_separated()
        );
    }

    if selection.is_select_all() {
        println!("Every transaction matching the filter is selected.");
    }

    if let Some(slider) = page.amount_slider() {
        let (lower, upper) = slider.values();
        println!("Amount filter: {lower} to {upper}");
    }
}
