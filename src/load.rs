//! Reading the payments list's row state back out of the rendered document.

use crate::payments::Row;
use tracing::error;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, NodeList};

/// Class of each row's selection checkbox.
pub const CHECKBOX_SELECTOR: &str = ".checkbox";
/// Hidden input carrying a row's identifier.
pub const ROW_ID_SELECTOR: &str = ".row-req-code";
/// Element whose text is an unpaid row's pay URL.
pub const PAY_URL_SELECTOR: &str = ".row-pay-url";
/// Class of rows that haven't been paid yet.
pub const UNPAID_CLASS: &str = "unpaid";

/// The row checkboxes in document order.
pub fn load_checkboxes(checkboxes: &NodeList) -> Vec<HtmlInputElement> {
	(0..checkboxes.length())
		.filter_map(|i| checkboxes.item(i))
		.filter_map(|node| match node.dyn_into::<HtmlInputElement>() {
			Ok(input) => Some(input),
			Err(node) => {
				error!("Expected row checkbox to be an `HtmlInputElement` but found {:?}; Skipping.", node);
				None
			}
		})
		.collect()
}

/// The loadable rows with their checkboxes, in document order.
///
/// Checkboxes whose row can't be loaded are skipped.
pub fn load_row_checkboxes(checkboxes: &NodeList) -> Vec<(HtmlInputElement, Row)> {
	load_checkboxes(checkboxes)
		.into_iter()
		.filter_map(|checkbox| {
			let row = load_row(&checkbox)?;
			Some((checkbox, row))
		})
		.collect()
}

/// Loads the row that `checkbox` selects.
pub fn load_row(checkbox: &HtmlInputElement) -> Option<Row> {
	let row = match checkbox.closest("tr") {
		Ok(Some(row)) => row,
		Ok(None) => {
			error!("Row checkbox outside of any table row; Skipping.");
			return None;
		}
		Err(error) => {
			error!("Failed to find row of checkbox: {:?}", error);
			return None;
		}
	};
	let id = match load_row_id(&row) {
		Some(id) => id,
		None => {
			error!("Table row without identifier; Skipping.");
			return None;
		}
	};
	Some(Row {
		id,
		checked: checkbox.checked(),
		pay_url: load_pay_url(&row),
	})
}

pub fn load_row_id(row: &Element) -> Option<String> {
	let id = row.query_selector(ROW_ID_SELECTOR).ok()??;
	id.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::value)
}

/// An unpaid row's pay URL. Paid rows don't link anywhere.
pub fn load_pay_url(row: &Element) -> Option<String> {
	if !row.class_list().contains(UNPAID_CLASS) {
		return None;
	}
	row.query_selector(PAY_URL_SELECTOR)
		.ok()??
		.text_content()
		.map(|url| url.trim().to_owned())
		.filter(|url| !url.is_empty())
}
