use super::{element, element_as, PageError};
use crate::{
	listeners::ListenerSlots,
	load::{self, CHECKBOX_SELECTOR},
	payments::{Action, PaymentsView, Row, Runtime, Transport, TransportError},
};
use core::{cell::RefCell, convert::TryFrom, time::Duration};
use futures::future::LocalBoxFuture;
use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use std::rc::Rc;
use tracing::{error, instrument, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
	Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, Request, RequestCredentials, RequestInit, Response, UrlSearchParams,
};

pub const LIST_ID: &str = "payments-data";
pub const SELECT_ALL_ID: &str = "master-checkbox";
pub const UNDO_ID: &str = "undo";
pub const UNDOABLE_IDS_ID: &str = "undoable-req-codes";
/// Optional element for failure messages. Without it, failures are shown with `alert`.
pub const FAILURE_ID: &str = "action-error";
pub const ACTION_BUTTON_SELECTOR: &str = ".action-button";
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Element ID of each action's button.
#[must_use]
pub fn action_button_id(action: Action) -> &'static str {
	match action {
		Action::MarkAsPaid => "mark-as-paid",
		Action::SendReminder => "send-reminder",
		Action::Delete => "delete",
	}
}

/// What a [`WebPaymentsPage`] listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageListener {
	Undo,
	Action(Action),
	/// Delegated clicks anywhere in the document, which survive list replacement.
	Document,
}

/// The payments list page, with its list region and controls.
#[derive(Debug)]
pub struct WebPaymentsPage {
	document: Document,
	list: Element,
	select_all: HtmlInputElement,
	undo: HtmlElement,
	listeners: RefCell<ListenerSlots<PageListener, EventListener>>,
}

impl WebPaymentsPage {
	/// # Errors
	///
	/// Iff the list region, select-all checkbox or undo control is missing.
	pub fn bind(document: &Document) -> Result<Self, PageError> {
		Ok(Self {
			document: document.clone(),
			list: element(document, LIST_ID)?,
			select_all: element_as(document, SELECT_ALL_ID, "`<input>`")?,
			undo: element_as(document, UNDO_ID, "HTML element")?,
			listeners: RefCell::default(),
		})
	}

	/// Attaches `handler` for `event_type` on `target`, replacing what was bound to `key` before.
	pub fn listen(
		&self,
		key: PageListener,
		target: &EventTarget,
		event_type: &'static str,
		mut handler: impl 'static + FnMut(&Event),
	) {
		self.listeners
			.borrow_mut()
			.rebind(key, || EventListener::new(target, event_type, move |event| handler(event)));
	}

	/// Where a click on `target` should navigate to.
	///
	/// That's the pay URL of the unpaid list row the click landed in, unless it landed on an input.
	#[must_use]
	pub fn navigation_target(&self, target: &Element) -> Option<String> {
		let row = target.closest("tr").ok()??;
		if !self.list.contains(Some(row.as_ref())) {
			return None;
		}
		let id = load::load_row_id(&row)?;
		let clicked_input = target.dyn_ref::<HtmlInputElement>().is_some();
		self.rows()
			.into_iter()
			.find(|candidate| candidate.id == id)?
			.navigation_target(clicked_input)
			.map(str::to_owned)
	}

	fn row_checkboxes(&self) -> Vec<(HtmlInputElement, Row)> {
		match self.list.query_selector_all(CHECKBOX_SELECTOR) {
			Ok(checkboxes) => load::load_row_checkboxes(&checkboxes),
			Err(error) => {
				error!("Failed to query row checkboxes: {:?}", error);
				Vec::new()
			}
		}
	}

	fn elements(&self, selector: &str) -> Vec<Element> {
		let nodes = match self.document.query_selector_all(selector) {
			Ok(nodes) => nodes,
			Err(error) => {
				error!("Failed to query {:?}: {:?}", selector, error);
				return Vec::new();
			}
		};
		(0..nodes.length()).filter_map(|i| nodes.item(i)).filter_map(|node| node.dyn_into().ok()).collect()
	}
}

impl PaymentsView for WebPaymentsPage {
	fn rows(&self) -> Vec<Row> {
		self.row_checkboxes().into_iter().map(|(_, row)| row).collect()
	}

	fn set_highlights(&self, highlighted: &[bool]) {
		let checkboxes = self.row_checkboxes();
		if checkboxes.len() != highlighted.len() {
			warn!(rows = checkboxes.len(), highlights = highlighted.len(), "Highlights don't match the rendered rows.");
		}
		for ((checkbox, _), &highlighted) in checkboxes.iter().zip(highlighted) {
			match checkbox.closest("tr") {
				Ok(Some(row)) => {
					if let Err(error) = row.class_list().toggle_with_force(HIGHLIGHT_CLASS, highlighted) {
						error!("Failed to toggle row highlight: {:?}", error)
					}
				}
				Ok(None) => warn!("Row checkbox outside of any table row."),
				Err(error) => error!("Failed to find row of checkbox: {:?}", error),
			}
		}
	}

	fn set_actions_disabled(&self, disabled: bool) {
		for button in self.elements(ACTION_BUTTON_SELECTOR) {
			let result = if disabled { button.set_attribute("disabled", "") } else { button.remove_attribute("disabled") };
			if let Err(error) = result {
				error!("Failed to update action button: {:?}", error)
			}
		}
	}

	fn set_select_all_disabled(&self, disabled: bool) {
		self.select_all.set_disabled(disabled)
	}

	fn set_select_all_checked(&self, checked: bool) {
		self.select_all.set_checked(checked)
	}

	fn is_select_all_checked(&self) -> bool {
		self.select_all.checked()
	}

	fn set_all_checked(&self, checked: bool) {
		for (checkbox, _) in self.row_checkboxes() {
			checkbox.set_checked(checked)
		}
	}

	fn replace_list(&self, html: &str) {
		self.list.set_inner_html(html)
	}

	fn undoable_ids(&self) -> String {
		self.document
			.get_element_by_id(UNDOABLE_IDS_ID)
			.and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
			.map(|input| input.value())
			.unwrap_or_default()
	}

	fn show_undo(&self, visible: bool) {
		self.undo.set_hidden(!visible)
	}

	fn bind_undo(&self, handler: Option<Rc<dyn Fn()>>) {
		let mut listeners = self.listeners.borrow_mut();
		listeners.unbind(&PageListener::Undo);
		if let Some(handler) = handler {
			let undo = &self.undo;
			listeners.rebind(PageListener::Undo, || EventListener::new(undo, "click", move |_| handler()));
		}
	}

	fn report_failure(&self, message: &str) {
		if let Some(failure) = self.document.get_element_by_id(FAILURE_ID) {
			failure.set_text_content(Some(message));
			if let Some(failure) = failure.dyn_ref::<HtmlElement>() {
				failure.set_hidden(false)
			}
			return;
		}
		match web_sys::window() {
			Some(window) => {
				if let Err(error) = window.alert_with_message(message) {
					error!("Failed to show failure message: {:?}", error)
				}
			}
			None => error!("No `window` to show failure message in: {}", message),
		}
	}

	fn clear_failure(&self) {
		if let Some(failure) = self.document.get_element_by_id(FAILURE_ID) {
			failure.set_text_content(None);
			if let Some(failure) = failure.dyn_ref::<HtmlElement>() {
				failure.set_hidden(true)
			}
		}
	}
}

/// POSTs with [***fetch***](https://developer.mozilla.org/en-US/docs/Web/API/fetch), sending same-origin credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
	fn post(&self, url: &str, fields: Vec<(String, String)>) -> LocalBoxFuture<'static, Result<String, TransportError>> {
		let url = url.to_owned();
		Box::pin(async move { fetch_text(&url, &fields).await })
	}
}

#[instrument(skip(fields))]
async fn fetch_text(url: &str, fields: &[(String, String)]) -> Result<String, TransportError> {
	let params = UrlSearchParams::new().map_err(network_error)?;
	for (name, value) in fields {
		params.append(name, value);
	}

	let init = RequestInit::new();
	init.set_method("POST");
	init.set_body(&JsValue::from(params));
	init.set_credentials(RequestCredentials::SameOrigin);
	let request = Request::new_with_str_and_init(url, &init).map_err(network_error)?;

	let window = web_sys::window().ok_or_else(|| TransportError::Network("no `window`".to_owned()))?;
	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(network_error)?
		.dyn_into()
		.map_err(network_error)?;
	if !response.ok() {
		return Err(TransportError::Status(response.status()));
	}

	let text = JsFuture::from(response.text().map_err(network_error)?).await.map_err(network_error)?;
	text.as_string().ok_or(TransportError::BodyNotText)
}

#[allow(clippy::needless_pass_by_value)]
fn network_error(error: JsValue) -> TransportError {
	TransportError::Network(format!("{:?}", error))
}

/// Longest timer delay browsers honour. Longer delays overflow and fire immediately.
pub const MAX_TIMEOUT_MILLIS: u32 = 0x7FFF_FFFF;

/// `delay` as a browser timer delay, clamped to [`MAX_TIMEOUT_MILLIS`].
#[must_use]
pub fn timeout_millis(delay: Duration) -> u32 {
	u32::try_from(delay.as_millis()).map_or(MAX_TIMEOUT_MILLIS, |millis| millis.min(MAX_TIMEOUT_MILLIS))
}

/// Browser timers and the [`wasm_bindgen_futures`] task queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebRuntime;

impl Runtime for WebRuntime {
	type Timer = Timeout;

	fn now(&self) -> f64 {
		js_sys::Date::now()
	}

	fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Timeout {
		Timeout::new(timeout_millis(delay), callback)
	}

	fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
		wasm_bindgen_futures::spawn_local(task)
	}
}
