//! Page entry points. Each `init…Page` function wires one page and returns a handle that keeps it wired.
//!
//! Pages call `checkForm()` on the returned handle before submitting, and submit only if it returns `true`.

use super::{
	document, element,
	form::{WebAccountTabs, WebForm},
	payments::{action_button_id, FetchTransport, PageListener, WebPaymentsPage, WebRuntime, SELECT_ALL_ID},
	PageError,
};
use crate::{
	composite::{RequestField, RequestPaymentForm},
	form::{Activation, FieldRole, ValidationSession},
	forms::{self, ChangePasswordField, LoginField, ResetPasswordField, SettingsField, SignupField},
	listeners::ListenerSlots,
	payments::{Action, Dispatcher, DispatcherConfig, Toggled},
};
use gloo_events::EventListener;
use std::rc::Rc;
use tracing::{debug, error, info, instrument};
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{Document, Element, HtmlInputElement};

/// Element IDs of the settings page's buttons.
const SAVE_ID: &str = "save";
const CANCEL_ID: &str = "cancel";

/// Present iff the change password page serves a reset link.
const RESET_KEY_ID: &str = "key";

/// Present iff the visitor isn't logged in (and so has to sign up or log in while requesting a payment).
const ACCOUNT_BOX_ID: &str = "account-box";

enum PageForm {
	Login(Rc<ValidationSession<LoginField>>),
	Signup(Rc<ValidationSession<SignupField>>),
	Settings(Rc<ValidationSession<SettingsField>>),
	ChangePassword(Rc<ValidationSession<ChangePasswordField>>),
	ResetPassword(Rc<ValidationSession<ResetPasswordField>>),
	RequestPayment(RequestPaymentForm),
}

/// A wired form page.
#[wasm_bindgen]
pub struct FormPage {
	form: PageForm,
	listeners: ListenerSlots<(&'static str, &'static str), EventListener>,
}

#[wasm_bindgen]
impl FormPage {
	/// Arms live validation (once) and validates the whole form.
	///
	/// Returns whether the form may be submitted.
	#[wasm_bindgen(js_name = checkForm)]
	#[must_use]
	pub fn check_form(&self) -> bool {
		match &self.form {
			PageForm::Login(session) => session.check_form(),
			PageForm::Signup(session) => session.check_form(),
			PageForm::Settings(session) => session.check_form(),
			PageForm::ChangePassword(session) => session.check_form(),
			PageForm::ResetPassword(session) => session.check_form(),
			PageForm::RequestPayment(form) => form.check_form(),
		}
	}
}

impl FormPage {
	fn new(form: PageForm) -> Self {
		Self {
			form,
			listeners: ListenerSlots::new(),
		}
	}
}

fn bind_session<F: FieldRole>(
	document: &Document,
	registry: crate::form::Registry<F>,
) -> Result<(Rc<WebForm<F>>, Rc<ValidationSession<F>>), PageError> {
	let view = Rc::new(WebForm::bind(document, &registry.watched())?);
	let session = ValidationSession::new(registry, view.clone(), Activation::OnCheck);
	Ok((view, session))
}

/// # Errors
///
/// Iff a login field is missing.
#[wasm_bindgen(js_name = initLoginPage)]
#[instrument]
pub fn init_login_page() -> Result<FormPage, JsValue> {
	let (_, session) = bind_session(&document()?, LoginField::registry())?;
	Ok(FormPage::new(PageForm::Login(session)))
}

/// Keeps the PayPal email field in sync with the "copy email" checkbox and the primary email.
fn wire_paypal_email_copy(view: &Rc<WebForm<SignupField>>) {
	let weak = Rc::downgrade(view);
	view.listen(SignupField::CopyEmail, "click", "copy-email", move |_| {
		if let Some(view) = weak.upgrade() {
			forms::sync_paypal_email(&*view)
		}
	});
	let weak = Rc::downgrade(view);
	view.listen(SignupField::Email, "input", "copy-email", move |_| {
		if let Some(view) = weak.upgrade() {
			forms::maybe_copy_email(&*view)
		}
	});
	// Restored form state after navigating back.
	forms::sync_paypal_email(&**view);
}

fn bind_signup(document: &Document) -> Result<Rc<WebForm<SignupField>>, PageError> {
	let view = Rc::new(WebForm::bind(document, SignupField::ALL)?);
	wire_paypal_email_copy(&view);
	Ok(view)
}

/// # Errors
///
/// Iff a signup field is missing.
#[wasm_bindgen(js_name = initSignupPage)]
#[instrument]
pub fn init_signup_page() -> Result<FormPage, JsValue> {
	let view = bind_signup(&document()?)?;
	let session = ValidationSession::new(SignupField::registry(), view, Activation::OnCheck);
	Ok(FormPage::new(PageForm::Signup(session)))
}

/// # Errors
///
/// Iff a settings field or button is missing.
#[wasm_bindgen(js_name = initSettingsPage)]
#[instrument]
pub fn init_settings_page() -> Result<FormPage, JsValue> {
	let document = document()?;
	let (view, session) = bind_session(&document, SettingsField::registry())?;
	let save = element(&document, SAVE_ID)?;
	let cancel = element(&document, CANCEL_ID)?;

	for &field in SettingsField::ALL {
		let (save, cancel) = (save.clone(), cancel.clone());
		view.listen(field, "input", "edited", move |_| {
			enable(&save);
			enable(&cancel);
		});
	}

	let mut page = FormPage::new(PageForm::Settings(session));
	page.listeners.rebind((CANCEL_ID, "click"), || {
		EventListener::new(&cancel, "click", |_| match web_sys::window().map(|window| window.location().reload()) {
			Some(Ok(())) => (),
			Some(Err(error)) => error!("Failed to reload: {:?}", error),
			None => error!("No `window` to reload."),
		})
	});
	Ok(page)
}

fn enable(button: &Element) {
	if let Err(error) = button.remove_attribute("disabled") {
		error!("Failed to enable button: {:?}", error)
	}
}

/// # Errors
///
/// Iff a password field is missing.
#[wasm_bindgen(js_name = initChangePasswordPage)]
#[instrument]
pub fn init_change_password_page() -> Result<FormPage, JsValue> {
	let document = document()?;
	let reset = document.get_element_by_id(RESET_KEY_ID).is_some();
	debug!(reset);
	let (_, session) = bind_session(&document, ChangePasswordField::registry(reset))?;
	Ok(FormPage::new(PageForm::ChangePassword(session)))
}

/// # Errors
///
/// Iff the email field is missing.
#[wasm_bindgen(js_name = initResetPasswordPage)]
#[instrument]
pub fn init_reset_password_page() -> Result<FormPage, JsValue> {
	let (_, session) = bind_session(&document()?, ResetPasswordField::registry())?;
	Ok(FormPage::new(PageForm::ResetPassword(session)))
}

/// # Errors
///
/// Iff a field of the request form (or, for anonymous visitors, of the signup or login form) is missing.
#[wasm_bindgen(js_name = initRequestPaymentPage)]
#[instrument]
pub fn init_request_payment_page() -> Result<FormPage, JsValue> {
	let document = document()?;
	let view = Rc::new(WebForm::bind(&document, &RequestField::registry().watched())?);
	let logged_in = document.get_element_by_id(ACCOUNT_BOX_ID).is_none();
	debug!(logged_in);

	let form = if logged_in {
		RequestPaymentForm::new(view)
	} else {
		let signup_view = bind_signup(&document)?;
		let login_view = Rc::new(WebForm::bind(&document, LoginField::ALL)?);
		let tabs = Rc::new(WebAccountTabs::bind(&document)?);
		RequestPaymentForm::with_account(view, signup_view, login_view, tabs)
	};
	Ok(FormPage::new(PageForm::RequestPayment(form)))
}

/// The wired payments list page.
#[wasm_bindgen]
pub struct PaymentsPage {
	dispatcher: Rc<Dispatcher<FetchTransport, WebRuntime>>,
	page: Rc<WebPaymentsPage>,
}

#[wasm_bindgen]
impl PaymentsPage {
	/// Whether the latest action can still be undone.
	#[wasm_bindgen(getter, js_name = undoPending)]
	#[must_use]
	pub fn undo_pending(&self) -> bool {
		self.dispatcher.pending_undo().is_some()
	}
}

impl PaymentsPage {
	#[must_use]
	pub fn page(&self) -> &Rc<WebPaymentsPage> {
		&self.page
	}
}

/// # Errors
///
/// Iff the list region, select-all checkbox, undo control or an action button is missing.
#[wasm_bindgen(js_name = initPaymentsPage)]
#[instrument]
pub fn init_payments_page() -> Result<PaymentsPage, JsValue> {
	let document = document()?;
	let page = Rc::new(WebPaymentsPage::bind(&document)?);
	let dispatcher = Dispatcher::new(DispatcherConfig::default(), page.clone(), FetchTransport, WebRuntime);

	for &action in &Action::ALL {
		let button = element(&document, action_button_id(action))?;
		let weak = Rc::downgrade(&dispatcher);
		page.listen(PageListener::Action(action), &button, "click", move |_| {
			if let Some(dispatcher) = weak.upgrade() {
				wasm_bindgen_futures::spawn_local(async move {
					match dispatcher.apply_action(action).await {
						Ok(applied) => debug!(undoable = applied.undoable.len(), "Applied {:?}.", action),
						Err(error) => info!(%error, "{:?} not applied.", action),
					}
				})
			}
		});
	}

	// One delegated listener, since the list's checkboxes are replaced along with the list.
	let (weak_dispatcher, weak_page) = (Rc::downgrade(&dispatcher), Rc::downgrade(&page));
	page.listen(PageListener::Document, &document, "click", move |event| {
		if let (Some(dispatcher), Some(page)) = (weak_dispatcher.upgrade(), weak_page.upgrade()) {
			document_clicked(&dispatcher, &page, event)
		}
	});

	dispatcher.update_selection_state();
	Ok(PaymentsPage { dispatcher, page })
}

fn document_clicked(dispatcher: &Dispatcher<FetchTransport, WebRuntime>, page: &WebPaymentsPage, event: &web_sys::Event) {
	let target = match event.target().and_then(|target| target.dyn_into::<Element>().ok()) {
		Some(target) => target,
		None => return,
	};

	if let Some(input) = target.dyn_ref::<HtmlInputElement>().filter(|input| input.type_() == "checkbox") {
		dispatcher.toggled(if input.id() == SELECT_ALL_ID { Toggled::SelectAll } else { Toggled::Row });
		return;
	}

	if let Some(url) = page.navigation_target(&target) {
		if let Some(Err(error)) = web_sys::window().map(|window| window.location().set_href(&url)) {
			error!("Failed to navigate to pay URL: {:?}", error)
		}
	}
}
