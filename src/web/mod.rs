//! [`web_sys`] implementations of the page seams, and the page entry points exported to JavaScript.

mod form;
mod pages;
mod payments;

pub use form::{WebAccountTabs, WebForm};
pub use pages::*;
pub use payments::{timeout_millis, FetchTransport, PageListener, WebPaymentsPage, WebRuntime, MAX_TIMEOUT_MILLIS};

use thiserror::Error;
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{Document, Element};

#[derive(Debug, Error)]
pub enum PageError {
	#[error("No global `window` exists.")]
	NoWindow,
	#[error("No `document` exists on `window`.")]
	NoDocument,
	#[error("Missing element #{0}.")]
	MissingElement(String),
	#[error("Element #{id} is not an {expected}.")]
	UnexpectedElement { id: String, expected: &'static str },
}

impl From<PageError> for JsValue {
	fn from(error: PageError) -> Self {
		js_sys::Error::new(&error.to_string()).into()
	}
}

pub(crate) fn document() -> Result<Document, PageError> {
	web_sys::window().ok_or(PageError::NoWindow)?.document().ok_or(PageError::NoDocument)
}

pub(crate) fn element(document: &Document, id: &str) -> Result<Element, PageError> {
	document.get_element_by_id(id).ok_or_else(|| PageError::MissingElement(id.to_owned()))
}

pub(crate) fn element_as<T: JsCast>(document: &Document, id: &str, expected: &'static str) -> Result<T, PageError> {
	element(document, id)?.dyn_into().map_err(|_| PageError::UnexpectedElement { id: id.to_owned(), expected })
}

/// Sends [`tracing`] output to the browser console and panic messages to `console.error`.
#[cfg(feature = "console")]
#[wasm_bindgen(js_name = installConsoleDiagnostics)]
pub fn install_console_diagnostics() {
	console_error_panic_hook::set_once();
	if let Err(error) = tracing_wasm::try_set_as_global_default() {
		tracing::warn!("Console logging was already installed: {}", error);
	}
}
