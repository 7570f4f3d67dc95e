//! The payments list: selection state and bulk actions with a single, expiring undo.

use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Display, Formatter},
	iter::FromIterator,
	time::Duration,
};
use futures::future::LocalBoxFuture;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::{debug, error, instrument, trace};

/// One row of the payments list, as currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
	pub id: String,
	pub checked: bool,
	/// Where the payer can pay. Only unpaid rows have one.
	pub pay_url: Option<String>,
}

impl Row {
	/// Where clicking this row should navigate to.
	///
	/// Clicks on the row's inputs (its checkbox) never navigate.
	#[must_use]
	pub fn navigation_target(&self, clicked_input: bool) -> Option<&str> {
		if clicked_input {
			None
		} else {
			self.pay_url.as_deref()
		}
	}
}

/// An ordered set of row identifiers, as exchanged with the server in comma-joined form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIds(Vec<String>);

impl RowIds {
	/// Parses a comma-joined list. Empty segments are skipped, so `""` yields no identifiers.
	#[must_use]
	pub fn parse(joined: &str) -> Self {
		joined.split(',').filter(|id| !id.is_empty()).map(str::to_owned).collect()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl '_ + Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}

impl FromIterator<String> for RowIds {
	fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
		let mut ids = Vec::new();
		for id in iter {
			if !ids.contains(&id) {
				ids.push(id)
			}
		}
		Self(ids)
	}
}

impl Display for RowIds {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0.join(","))
	}
}

/// Row and selection counts, from which every selection-dependent control state follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
	pub rows: usize,
	pub selected: usize,
}

impl SelectionState {
	#[must_use]
	pub fn of(rows: &[Row]) -> Self {
		Self {
			rows: rows.len(),
			selected: rows.iter().filter(|row| row.checked).count(),
		}
	}

	#[must_use]
	pub fn actions_disabled(self) -> bool {
		self.selected == 0
	}

	#[must_use]
	pub fn select_all_disabled(self) -> bool {
		self.rows == 0
	}

	/// [`None`] while there are no rows, in which case the select-all checkbox is left as is.
	#[must_use]
	pub fn select_all_checked(self) -> Option<bool> {
		if self.rows == 0 {
			None
		} else {
			Some(self.selected == self.rows)
		}
	}
}

/// A bulk action on the selected payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
	MarkAsPaid,
	SendReminder,
	Delete,
}

impl Action {
	pub const ALL: [Self; 3] = [Self::MarkAsPaid, Self::SendReminder, Self::Delete];
}

/// Endpoints and timing of the [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
	pub mark_as_paid_url: String,
	pub send_reminder_url: String,
	pub delete_url: String,
	/// How long an action stays undoable.
	pub undo_window: Duration,
	/// Name of the request parameter carrying the comma-joined row identifiers.
	pub row_ids_param: String,
	/// Name of the request parameter that is present (and empty) iff the request is an undo.
	pub undo_param: String,
}

impl Default for DispatcherConfig {
	fn default() -> Self {
		Self {
			mark_as_paid_url: "/payments/mark-as-paid".to_owned(),
			send_reminder_url: "/payments/send-reminder".to_owned(),
			delete_url: "/payments/delete".to_owned(),
			undo_window: Duration::from_secs(30),
			row_ids_param: "rowIds".to_owned(),
			undo_param: "undo".to_owned(),
		}
	}
}

impl DispatcherConfig {
	#[must_use]
	pub fn url(&self, action: Action) -> &str {
		match action {
			Action::MarkAsPaid => &self.mark_as_paid_url,
			Action::SendReminder => &self.send_reminder_url,
			Action::Delete => &self.delete_url,
		}
	}
}

/// The body of a bulk action request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
	pub row_ids: RowIds,
	pub undo: bool,
}

impl ActionRequest {
	/// Form fields (name, value) in submission order.
	#[must_use]
	pub fn form_fields(&self, config: &DispatcherConfig) -> Vec<(String, String)> {
		let mut fields = vec![(config.row_ids_param.clone(), self.row_ids.to_string())];
		if self.undo {
			fields.push((config.undo_param.clone(), String::new()))
		}
		fields
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	#[error("the request failed: {0}")]
	Network(String),
	#[error("the server responded with status {0}")]
	Status(u16),
	#[error("the response body is not text")]
	BodyNotText,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
	#[error("Could not update your payments ({0}). Please try again.")]
	Transport(#[from] TransportError),
	#[error("There is nothing to undo.")]
	NoPendingUndo,
	#[error("The undo is already in progress.")]
	UndoInFlight,
}

/// Sends state-changing requests to the server.
pub trait Transport {
	/// POSTs `fields` form-encoded to `url`.
	///
	/// Resolves to the response body iff the server confirmed success.
	fn post(&self, url: &str, fields: Vec<(String, String)>) -> LocalBoxFuture<'static, Result<String, TransportError>>;
}

/// Timers and task spawning of the (single-threaded) host.
pub trait Runtime {
	/// A scheduled callback, which is cancelled when this handle is dropped.
	type Timer;

	/// Milliseconds since the Unix epoch.
	fn now(&self) -> f64;

	fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Timer;

	fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// The part of a page that shows the payments list and its controls.
pub trait PaymentsView {
	/// The currently rendered rows, in document order.
	fn rows(&self) -> Vec<Row>;

	/// Highlights each row of [`rows`](`PaymentsView::rows`) by the entry at its index.
	fn set_highlights(&self, highlighted: &[bool]);

	/// Enables or disables all bulk action buttons.
	fn set_actions_disabled(&self, disabled: bool);

	fn set_select_all_disabled(&self, disabled: bool);

	fn set_select_all_checked(&self, checked: bool);

	fn is_select_all_checked(&self) -> bool;

	/// Checks or unchecks every row.
	fn set_all_checked(&self, checked: bool);

	/// Replaces the list region with server-rendered markup.
	fn replace_list(&self, html: &str);

	/// The comma-joined identifiers the currently rendered list marks as undoable.
	fn undoable_ids(&self) -> String;

	fn show_undo(&self, visible: bool);

	/// Detaches the undo control's click handler, then attaches `handler` if there is one.
	fn bind_undo(&self, handler: Option<Rc<dyn Fn()>>);

	/// Shows a user-facing failure message.
	fn report_failure(&self, message: &str);

	/// Removes the failure message, if one is shown.
	fn clear_failure(&self);
}

/// What a successful action left undoable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
	pub undoable: RowIds,
}

/// Which checkbox the user toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
	SelectAll,
	Row,
}

/// The outstanding undo of the latest action.
struct UndoToken<T> {
	action_url: String,
	row_ids: RowIds,
	expires_at: f64,
	generation: u64,
	in_flight: bool,
	_timer: T,
}

/// Read-only view of the live undo token.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUndo {
	pub action_url: String,
	pub row_ids: RowIds,
	/// Milliseconds since the Unix epoch.
	pub expires_at: f64,
}

/// Applies bulk actions to the selected payments and manages the undo affordance.
///
/// At most one undo token is live at any time.
/// Replacing or consuming it drops its expiry timer, which cancels it.
pub struct Dispatcher<T, R: Runtime> {
	config: DispatcherConfig,
	view: Rc<dyn PaymentsView>,
	transport: T,
	runtime: R,
	undo: RefCell<Option<UndoToken<R::Timer>>>,
	generation: Cell<u64>,
	this: Weak<Self>,
}

impl<T, R: Runtime> Debug for Dispatcher<T, R> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatcher")
			.field("config", &self.config)
			.field("pending_undo", &self.pending_undo())
			.finish_non_exhaustive()
	}
}

impl<T, R: Runtime> Dispatcher<T, R> {
	#[must_use]
	pub fn view(&self) -> &Rc<dyn PaymentsView> {
		&self.view
	}

	#[must_use]
	pub fn pending_undo(&self) -> Option<PendingUndo> {
		self.undo.borrow().as_ref().map(|token| PendingUndo {
			action_url: token.action_url.clone(),
			row_ids: token.row_ids.clone(),
			expires_at: token.expires_at,
		})
	}
}

impl<T, R> Dispatcher<T, R>
where
	T: 'static + Transport,
	R: 'static + Runtime,
{
	#[must_use]
	pub fn new(config: DispatcherConfig, view: Rc<dyn PaymentsView>, transport: T, runtime: R) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			config,
			view,
			transport,
			runtime,
			undo: RefCell::new(None),
			generation: Cell::new(0),
			this: this.clone(),
		})
	}

	/// The identifiers of all currently checked rows.
	#[must_use]
	pub fn selection(&self) -> RowIds {
		self.view.rows().into_iter().filter(|row| row.checked).map(|row| row.id).collect()
	}

	/// Brings row highlights, action buttons and the select-all checkbox in line with the rendered rows.
	#[instrument(skip(self))]
	pub fn update_selection_state(&self) {
		let rows = self.view.rows();
		let highlighted: Vec<bool> = rows.iter().map(|row| row.checked).collect();
		self.view.set_highlights(&highlighted);
		let state = SelectionState::of(&rows);
		trace!(?state);
		self.view.set_actions_disabled(state.actions_disabled());
		self.view.set_select_all_disabled(state.select_all_disabled());
		if let Some(checked) = state.select_all_checked() {
			self.view.set_select_all_checked(checked)
		}
	}

	/// Handles a click on any checkbox of the list.
	pub fn toggled(&self, toggled: Toggled) {
		if toggled == Toggled::SelectAll {
			self.view.set_all_checked(self.view.is_select_all_checked())
		}
		self.update_selection_state()
	}

	/// Applies `action` to the current selection.
	///
	/// # Errors
	///
	/// Iff the server didn't confirm the action. The list is left untouched in that case,
	/// and the failure has already been reported through the view.
	pub async fn apply_action(&self, action: Action) -> Result<Applied, DispatchError> {
		let url = self.config.url(action).to_owned();
		self.dispatch(url, self.selection(), false).await
	}

	/// Reverts the latest action, on the rows it made undoable at the time.
	///
	/// # Errors
	///
	/// [`DispatchError::NoPendingUndo`] if the undo window closed,
	/// [`DispatchError::UndoInFlight`] if this undo was already sent,
	/// or a transport failure (after which the undo can be retried while its window is open).
	pub async fn undo(&self) -> Result<Applied, DispatchError> {
		let (url, row_ids, generation) = {
			let mut slot = self.undo.borrow_mut();
			let token = slot.as_mut().ok_or(DispatchError::NoPendingUndo)?;
			if token.in_flight {
				return Err(DispatchError::UndoInFlight);
			}
			token.in_flight = true;
			(token.action_url.clone(), token.row_ids.clone(), token.generation)
		};

		let result = self.dispatch(url, row_ids, true).await;
		if result.is_err() {
			if let Some(token) = self.undo.borrow_mut().as_mut().filter(|token| token.generation == generation) {
				token.in_flight = false
			}
		}
		result
	}

	#[instrument(skip(self, row_ids), fields(rows = row_ids.len()))]
	async fn dispatch(&self, url: String, row_ids: RowIds, undo: bool) -> Result<Applied, DispatchError> {
		#[cfg(feature = "dangerous-logging")]
		debug!(%row_ids, "Sending bulk action.");
		#[cfg(not(feature = "dangerous-logging"))]
		debug!("Sending bulk action.");

		let request = ActionRequest { row_ids, undo };
		let html = match self.transport.post(&url, request.form_fields(&self.config)).await {
			Ok(html) => html,
			Err(transport_error) => {
				let dispatch_error = DispatchError::from(transport_error);
				error!(%dispatch_error, "Bulk action failed. Leaving the list as is.");
				self.view.report_failure(&dispatch_error.to_string());
				return Err(dispatch_error);
			}
		};

		let superseded = self.undo.borrow_mut().take();
		if let Some(superseded) = superseded {
			trace!(generation = superseded.generation, "Cancelling previous undo.");
		}

		self.view.clear_failure();
		self.view.replace_list(&html);
		let undoable = RowIds::parse(&self.view.undoable_ids());
		let undoable = if !undo && !undoable.is_empty() {
			self.arm_undo(url, undoable.clone());
			undoable
		} else {
			self.view.bind_undo(None);
			self.view.show_undo(false);
			RowIds::default()
		};
		self.update_selection_state();
		Ok(Applied { undoable })
	}

	fn arm_undo(&self, action_url: String, row_ids: RowIds) {
		let generation = self.generation.get() + 1;
		self.generation.set(generation);

		let this = self.this.clone();
		let timer = self.runtime.schedule(
			self.config.undo_window,
			Box::new(move || {
				if let Some(dispatcher) = this.upgrade() {
					dispatcher.expire(generation)
				}
			}),
		);
		let expires_at = self.runtime.now() + self.config.undo_window.as_secs_f64() * 1000.;
		debug!(generation, rows = row_ids.len(), expires_at, "Undo available.");

		let superseded = self.undo.borrow_mut().replace(UndoToken {
			action_url,
			row_ids,
			expires_at,
			generation,
			in_flight: false,
			_timer: timer,
		});
		drop(superseded);

		let this = self.this.clone();
		self.view.bind_undo(Some(Rc::new(move || {
			if let Some(dispatcher) = this.upgrade() {
				let task = Rc::clone(&dispatcher);
				dispatcher.runtime.spawn(Box::pin(async move {
					if let Err(error) = task.undo().await {
						debug!(%error, "Undo not applied.");
					}
				}));
			}
		})));
		self.view.show_undo(true);
	}

	fn expire(&self, generation: u64) {
		let expired = {
			let mut slot = self.undo.borrow_mut();
			if slot.as_ref().map_or(false, |token| token.generation == generation) {
				slot.take()
			} else {
				None
			}
		};
		if expired.is_some() {
			debug!(generation, "Undo window closed.");
			self.view.bind_undo(None);
			self.view.show_undo(false);
		} else {
			trace!(generation, "Ignoring expiry of a replaced undo.");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::executor::block_on;
	use hashbrown::HashSet;
	use std::collections::VecDeque;

	/// Renders `rows:<ids>|undoable:<ids>` "markup".
	fn render(rows: &str, undoable: &str) -> String {
		format!("rows:{}|undoable:{}", rows, undoable)
	}

	#[derive(Default)]
	struct FakePage {
		rows: RefCell<Vec<Row>>,
		highlighted: RefCell<Vec<bool>>,
		actions_disabled: Cell<Option<bool>>,
		select_all_disabled: Cell<Option<bool>>,
		select_all_checked: Cell<bool>,
		undoable: RefCell<String>,
		undo_visible: Cell<bool>,
		undo_handler: RefCell<Option<Rc<dyn Fn()>>>,
		undo_rebinds: Cell<usize>,
		failures: RefCell<Vec<String>>,
		failure_shown: Cell<bool>,
		replacements: Cell<usize>,
	}

	impl FakePage {
		fn with_rows(ids: &[&str]) -> Rc<Self> {
			let page = Rc::new(Self::default());
			page.replace_list(&render(&ids.join(","), ""));
			page.replacements.set(0);
			page
		}

		fn check(&self, id: &str, checked: bool) {
			for row in self.rows.borrow_mut().iter_mut().filter(|row| row.id == id) {
				row.checked = checked
			}
		}

		fn click_undo(&self) {
			let handler = self.undo_handler.borrow().clone();
			handler.expect("undo handler bound")()
		}
	}

	impl PaymentsView for FakePage {
		fn rows(&self) -> Vec<Row> {
			self.rows.borrow().clone()
		}

		fn set_highlights(&self, highlighted: &[bool]) {
			assert_eq!(highlighted.len(), self.rows.borrow().len());
			*self.highlighted.borrow_mut() = highlighted.to_vec()
		}

		fn set_actions_disabled(&self, disabled: bool) {
			self.actions_disabled.set(Some(disabled))
		}

		fn set_select_all_disabled(&self, disabled: bool) {
			self.select_all_disabled.set(Some(disabled))
		}

		fn set_select_all_checked(&self, checked: bool) {
			self.select_all_checked.set(checked)
		}

		fn is_select_all_checked(&self) -> bool {
			self.select_all_checked.get()
		}

		fn set_all_checked(&self, checked: bool) {
			for row in self.rows.borrow_mut().iter_mut() {
				row.checked = checked
			}
		}

		fn replace_list(&self, html: &str) {
			self.replacements.set(self.replacements.get() + 1);
			let mut parts = html.split('|');
			let rows = parts.next().and_then(|rows| rows.strip_prefix("rows:")).unwrap_or_default();
			let undoable = parts.next().and_then(|undoable| undoable.strip_prefix("undoable:")).unwrap_or_default();
			let rows: Vec<Row> = RowIds::parse(rows)
				.iter()
				.map(|id| Row {
					id: id.to_owned(),
					checked: false,
					pay_url: None,
				})
				.collect();
			*self.highlighted.borrow_mut() = vec![false; rows.len()];
			*self.rows.borrow_mut() = rows;
			*self.undoable.borrow_mut() = undoable.to_owned();
		}

		fn undoable_ids(&self) -> String {
			self.undoable.borrow().clone()
		}

		fn show_undo(&self, visible: bool) {
			self.undo_visible.set(visible)
		}

		fn bind_undo(&self, handler: Option<Rc<dyn Fn()>>) {
			self.undo_rebinds.set(self.undo_rebinds.get() + 1);
			*self.undo_handler.borrow_mut() = handler;
		}

		fn report_failure(&self, message: &str) {
			self.failures.borrow_mut().push(message.to_owned());
			self.failure_shown.set(true)
		}

		fn clear_failure(&self) {
			self.failure_shown.set(false)
		}
	}

	#[derive(Default)]
	struct FakeServer {
		requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
		responses: RefCell<VecDeque<Result<String, TransportError>>>,
	}

	impl FakeServer {
		fn respond(&self, response: Result<String, TransportError>) {
			self.responses.borrow_mut().push_back(response)
		}
	}

	impl Transport for Rc<FakeServer> {
		fn post(&self, url: &str, fields: Vec<(String, String)>) -> LocalBoxFuture<'static, Result<String, TransportError>> {
			self.requests.borrow_mut().push((url.to_owned(), fields));
			let response = self.responses.borrow_mut().pop_front().unwrap_or(Err(TransportError::Status(500)));
			Box::pin(async move { response })
		}
	}

	struct FakeTimer {
		id: usize,
		cancelled: Rc<RefCell<HashSet<usize>>>,
	}

	impl Drop for FakeTimer {
		fn drop(&mut self) {
			self.cancelled.borrow_mut().insert(self.id);
		}
	}

	#[derive(Default)]
	struct FakeRuntime {
		timers: RefCell<Vec<(Duration, Option<Box<dyn FnOnce()>>)>>,
		cancelled: Rc<RefCell<HashSet<usize>>>,
		fired: Cell<usize>,
		tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
	}

	impl FakeRuntime {
		/// Fires every due, uncancelled timer.
		fn elapse(&self) {
			let due: Vec<_> = self
				.timers
				.borrow_mut()
				.iter_mut()
				.enumerate()
				.filter(|(id, _)| !self.cancelled.borrow().contains(id))
				.filter_map(|(_, (_, callback))| callback.take())
				.collect();
			for callback in due {
				self.fired.set(self.fired.get() + 1);
				callback()
			}
		}

		fn pending_timers(&self) -> usize {
			self.timers
				.borrow()
				.iter()
				.enumerate()
				.filter(|(id, (_, callback))| callback.is_some() && !self.cancelled.borrow().contains(id))
				.count()
		}

		fn run_tasks(&self) {
			let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
			for task in tasks {
				block_on(task)
			}
		}
	}

	impl Runtime for Rc<FakeRuntime> {
		type Timer = FakeTimer;

		fn now(&self) -> f64 {
			1_000_000.
		}

		fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Timer {
			let mut timers = self.timers.borrow_mut();
			timers.push((delay, Some(callback)));
			FakeTimer {
				id: timers.len() - 1,
				cancelled: Rc::clone(&self.cancelled),
			}
		}

		fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
			self.tasks.borrow_mut().push(task)
		}
	}

	struct Harness {
		page: Rc<FakePage>,
		server: Rc<FakeServer>,
		runtime: Rc<FakeRuntime>,
		dispatcher: Rc<Dispatcher<Rc<FakeServer>, Rc<FakeRuntime>>>,
	}

	fn harness(ids: &[&str]) -> Harness {
		let page = FakePage::with_rows(ids);
		let server = Rc::new(FakeServer::default());
		let runtime = Rc::new(FakeRuntime::default());
		let dispatcher = Dispatcher::new(DispatcherConfig::default(), page.clone(), server.clone(), runtime.clone());
		dispatcher.update_selection_state();
		Harness {
			page,
			server,
			runtime,
			dispatcher,
		}
	}

	fn fields(row_ids: &str, undo: bool) -> Vec<(String, String)> {
		let mut fields = vec![("rowIds".to_owned(), row_ids.to_owned())];
		if undo {
			fields.push(("undo".to_owned(), String::new()))
		}
		fields
	}

	#[test]
	fn row_ids() {
		assert!(RowIds::parse("").is_empty());
		assert_eq!(RowIds::parse("3,7").to_string(), "3,7");
		assert_eq!(RowIds::parse("3,,7,").len(), 2);
		assert_eq!(RowIds::parse("3,7,3").to_string(), "3,7");
	}

	#[test]
	fn selection_state_invariants() {
		for rows in 0..4 {
			for selected in 0..=rows {
				let state = SelectionState { rows, selected };
				assert_eq!(state.actions_disabled(), selected == 0);
				assert_eq!(state.select_all_disabled(), rows == 0);
				assert_eq!(state.select_all_checked(), if rows > 0 { Some(selected == rows) } else { None });
			}
		}
	}

	#[test]
	fn selection_sync() {
		let h = harness(&["1", "2", "3"]);
		assert_eq!(h.page.actions_disabled.get(), Some(true));
		assert_eq!(h.page.select_all_disabled.get(), Some(false));
		assert!(!h.page.select_all_checked.get());

		h.page.check("2", true);
		h.dispatcher.toggled(Toggled::Row);
		assert_eq!(*h.page.highlighted.borrow(), [false, true, false]);
		assert_eq!(h.page.actions_disabled.get(), Some(false));

		h.page.check("1", true);
		h.page.check("3", true);
		h.dispatcher.toggled(Toggled::Row);
		assert!(h.page.select_all_checked.get());

		h.page.select_all_checked.set(false);
		h.dispatcher.toggled(Toggled::SelectAll);
		assert!(h.dispatcher.selection().is_empty());
		assert_eq!(*h.page.highlighted.borrow(), [false, false, false]);
		assert_eq!(h.page.actions_disabled.get(), Some(true));

		h.page.select_all_checked.set(true);
		h.dispatcher.toggled(Toggled::SelectAll);
		assert_eq!(h.dispatcher.selection().to_string(), "1,2,3");
	}

	#[test]
	fn empty_list_disables_select_all() {
		let h = harness(&[]);
		assert_eq!(h.page.select_all_disabled.get(), Some(true));
		assert_eq!(h.page.actions_disabled.get(), Some(true));
	}

	#[test]
	fn undo_targets_the_captured_rows() {
		let h = harness(&["1", "3", "5", "7", "9"]);
		h.page.check("3", true);
		h.page.check("7", true);

		h.server.respond(Ok(render("1,3,5,7,9", "3,7")));
		let applied = block_on(h.dispatcher.apply_action(Action::MarkAsPaid)).expect("applied");
		assert_eq!(applied.undoable.to_string(), "3,7");
		assert_eq!(*h.server.requests.borrow(), [("/payments/mark-as-paid".to_owned(), fields("3,7", false))]);
		assert!(h.page.undo_visible.get());
		let pending = h.dispatcher.pending_undo().expect("undo pending");
		assert_eq!(pending.expires_at, 1_030_000.);
		assert_eq!(h.runtime.timers.borrow()[0].0, Duration::from_secs(30));

		h.page.check("1", true);
		h.server.respond(Ok(render("1,3,5,7,9", "")));
		h.page.click_undo();
		h.runtime.run_tasks();

		let requests = h.server.requests.borrow();
		assert_eq!(requests.len(), 2);
		assert_eq!(requests[1], ("/payments/mark-as-paid".to_owned(), fields("3,7", true)));
		assert!(!h.page.undo_visible.get());
		assert!(h.dispatcher.pending_undo().is_none());
		assert_eq!(h.runtime.pending_timers(), 0);
		assert_eq!(h.runtime.fired.get(), 0);
	}

	#[test]
	fn undo_expires_once() {
		let h = harness(&["1", "2"]);
		h.page.check("1", true);
		h.server.respond(Ok(render("2", "1")));
		block_on(h.dispatcher.apply_action(Action::Delete)).expect("applied");
		assert!(h.page.undo_visible.get());

		h.runtime.elapse();
		h.runtime.elapse();
		assert_eq!(h.runtime.fired.get(), 1);
		assert!(!h.page.undo_visible.get());
		assert!(h.page.undo_handler.borrow().is_none());
		assert_eq!(block_on(h.dispatcher.undo()), Err(DispatchError::NoPendingUndo));
	}

	#[test]
	fn new_action_supersedes_undo() {
		let h = harness(&["1", "2", "3"]);
		h.page.check("1", true);
		h.server.respond(Ok(render("1,2,3", "1")));
		block_on(h.dispatcher.apply_action(Action::SendReminder)).expect("applied");

		h.page.check("2", true);
		h.server.respond(Ok(render("1,3", "2")));
		block_on(h.dispatcher.apply_action(Action::Delete)).expect("applied");

		assert!(h.runtime.cancelled.borrow().contains(&0));
		assert_eq!(h.runtime.pending_timers(), 1);
		assert_eq!(h.page.undo_rebinds.get(), 2);

		h.server.respond(Ok(render("1,2,3", "")));
		h.page.click_undo();
		h.runtime.run_tasks();
		assert_eq!(h.server.requests.borrow()[2], ("/payments/delete".to_owned(), fields("2", true)));

		h.runtime.elapse();
		assert_eq!(h.runtime.fired.get(), 0);
	}

	#[test]
	fn action_without_undoable_rows_hides_undo() {
		let h = harness(&["1"]);
		h.page.check("1", true);
		h.server.respond(Ok(render("1", "1")));
		block_on(h.dispatcher.apply_action(Action::MarkAsPaid)).expect("applied");

		h.page.check("1", true);
		h.server.respond(Ok(render("1", "")));
		let applied = block_on(h.dispatcher.apply_action(Action::SendReminder)).expect("applied");
		assert!(applied.undoable.is_empty());
		assert!(!h.page.undo_visible.get());
		assert!(h.page.undo_handler.borrow().is_none());
		assert_eq!(h.runtime.pending_timers(), 0);
	}

	#[test]
	fn failure_is_reported_and_leaves_the_list() {
		let h = harness(&["1", "2"]);
		h.page.check("2", true);
		h.server.respond(Err(TransportError::Status(503)));

		let result = block_on(h.dispatcher.apply_action(Action::Delete));
		assert_eq!(result, Err(DispatchError::Transport(TransportError::Status(503))));
		assert_eq!(h.page.replacements.get(), 0);
		assert_eq!(h.dispatcher.selection().to_string(), "2");
		assert_eq!(h.page.failures.borrow().len(), 1);
		assert!(h.page.failures.borrow()[0].contains("503"));
		assert!(h.page.failure_shown.get());

		h.server.respond(Ok(render("1", "2")));
		block_on(h.dispatcher.apply_action(Action::Delete)).expect("applied");
		assert!(!h.page.failure_shown.get());
		assert_eq!(h.page.failures.borrow().len(), 1);
		assert_eq!(h.page.replacements.get(), 1);
	}

	#[test]
	fn failed_undo_can_be_retried() {
		let h = harness(&["1", "2"]);
		h.page.check("1", true);
		h.server.respond(Ok(render("2", "1")));
		block_on(h.dispatcher.apply_action(Action::Delete)).expect("applied");

		h.server.respond(Err(TransportError::Network("offline".to_owned())));
		assert!(block_on(h.dispatcher.undo()).is_err());
		assert!(h.dispatcher.pending_undo().is_some());
		assert!(h.page.undo_visible.get());

		h.server.respond(Ok(render("1,2", "")));
		block_on(h.dispatcher.undo()).expect("undone");
		assert!(h.dispatcher.pending_undo().is_none());
	}

	#[test]
	fn double_click_on_undo_dispatches_once() {
		let h = harness(&["1"]);
		h.page.check("1", true);
		h.server.respond(Ok(render("", "1")));
		block_on(h.dispatcher.apply_action(Action::Delete)).expect("applied");

		h.server.respond(Ok(render("1", "")));
		h.page.click_undo();
		h.page.click_undo();
		h.runtime.run_tasks();
		assert_eq!(h.server.requests.borrow().len(), 2);
	}

	#[test]
	fn navigation() {
		let row = Row {
			id: "1".to_owned(),
			checked: false,
			pay_url: Some("/pay?code=1".to_owned()),
		};
		assert_eq!(row.navigation_target(false), Some("/pay?code=1"));
		assert_eq!(row.navigation_target(true), None);
	}
}
