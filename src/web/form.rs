use super::{element_as, PageError};
use crate::{
	composite::{AccountTab, AccountTabs},
	form::{FieldRole, FormView},
	forms::FieldWriter,
	listeners::ListenerSlots,
};
use core::cell::RefCell;
use gloo_events::EventListener;
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{error, instrument, warn};
use web_sys::{Document, Event, HtmlInputElement};

/// Class of the element, within a field's table row, that shows the field's error text.
pub const ERROR_TEXT_SELECTOR: &str = ".error-msg";

/// Listener purpose of live validation.
const VALIDATE: &str = "validate";

/// A form's input elements, looked up once by their field roles.
#[derive(Debug)]
pub struct WebForm<F: FieldRole> {
	inputs: HashMap<F, HtmlInputElement>,
	listeners: RefCell<ListenerSlots<(F, &'static str), EventListener>>,
}

impl<F: FieldRole> WebForm<F> {
	/// # Errors
	///
	/// Iff one of `fields` has no input element in `document`.
	#[instrument(skip(document))]
	pub fn bind(document: &Document, fields: &[F]) -> Result<Self, PageError> {
		let mut inputs = HashMap::with_capacity(fields.len());
		for &field in fields {
			inputs.insert(field, element_as(document, field.id(), "`<input>`")?);
		}
		Ok(Self {
			inputs,
			listeners: RefCell::default(),
		})
	}

	#[must_use]
	pub fn input(&self, field: F) -> Option<&HtmlInputElement> {
		let input = self.inputs.get(&field);
		if input.is_none() {
			error!(?field, "Field is not part of this form.");
		}
		input
	}

	/// Calls `handler` on each `event_type` event on `field`.
	///
	/// Replaces the handler previously registered for the same field and `purpose`.
	pub fn listen(&self, field: F, event_type: &'static str, purpose: &'static str, mut handler: impl 'static + FnMut(&Event)) {
		if let Some(input) = self.input(field) {
			self.listeners
				.borrow_mut()
				.rebind((field, purpose), || EventListener::new(input, event_type, move |event| handler(event)));
		}
	}
}

impl<F: FieldRole> FormView<F> for WebForm<F> {
	fn value(&self, field: F) -> String {
		self.input(field).map(HtmlInputElement::value).unwrap_or_default()
	}

	fn is_checked(&self, field: F) -> bool {
		self.input(field).map_or(false, HtmlInputElement::checked)
	}

	fn set_error(&self, field: F, message: &str) {
		let input = match self.input(field) {
			Some(input) => input,
			None => return,
		};
		let error_text = match input.closest("tr") {
			Ok(Some(row)) => row.query_selector(ERROR_TEXT_SELECTOR),
			Ok(None) => return warn!(?field, "Field is not inside a table row; Can't show its error."),
			Err(error) => return error!(?field, "Failed to find the field's row: {:?}", error),
		};
		match error_text {
			Ok(Some(error_text)) => error_text.set_text_content(Some(message)),
			Ok(None) => warn!(?field, "Field's row has no error text element."),
			Err(error) => error!(?field, "Failed to find the field's error text element: {:?}", error),
		}
	}

	/// Replaces the live validation handlers registered by an earlier call.
	fn on_input(&self, fields: &[F], handler: Rc<dyn Fn()>) {
		for &field in fields {
			let handler = Rc::clone(&handler);
			self.listen(field, "input", VALIDATE, move |_| handler());
		}
	}
}

impl<F: FieldRole> FieldWriter<F> for WebForm<F> {
	fn set_value(&self, field: F, value: &str) {
		if let Some(input) = self.input(field) {
			input.set_value(value)
		}
	}

	fn set_disabled(&self, field: F, disabled: bool) {
		if let Some(input) = self.input(field) {
			input.set_disabled(disabled)
		}
	}
}

/// The hidden input that tells the server (and the validation) whether the visitor is signing up.
#[derive(Debug)]
pub struct WebAccountTabs {
	do_signup: HtmlInputElement,
}

impl WebAccountTabs {
	pub const DO_SIGNUP_ID: &'static str = "do-signup";

	/// # Errors
	///
	/// Iff the page has no [`WebAccountTabs::DO_SIGNUP_ID`] input.
	pub fn bind(document: &Document) -> Result<Self, PageError> {
		Ok(Self {
			do_signup: element_as(document, Self::DO_SIGNUP_ID, "`<input>`")?,
		})
	}
}

impl AccountTabs for WebAccountTabs {
	fn showing(&self) -> AccountTab {
		if self.do_signup.value() == "true" {
			AccountTab::Signup
		} else {
			AccountTab::Login
		}
	}
}
