pub mod error;
pub mod fetcher;
pub mod script;
pub mod summary;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod text_extract;

pub use error::{FetchError, ScriptError};
pub use fetcher::{FetchedDocument, HttpFetcher, WebFetcher};
pub use script::{DailyScriptCatalog, ScriptLocator, ScriptSource, SfyCatalog};
pub use summary::{Encyclopedia, SummaryLocator, WikipediaClient};
pub use text_extract::{extract_html_text, extract_pdf_text};
