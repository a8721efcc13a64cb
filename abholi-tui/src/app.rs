use abholi_core::{
    model::{Dispatch, PickupRequest, Registration, RequestView, Role, User},
    service::ServiceError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuItem {
    Register,
    ToggleStatus,
    CreateRequest,
    ListUsers,
    ListRequests,
    CompletePickup,
    CompleteNextForCollector,
    Exit,
}

impl MenuItem {
    pub(crate) const ALL: [MenuItem; 8] = [
        MenuItem::Register,
        MenuItem::ToggleStatus,
        MenuItem::CreateRequest,
        MenuItem::ListUsers,
        MenuItem::ListRequests,
        MenuItem::CompletePickup,
        MenuItem::CompleteNextForCollector,
        MenuItem::Exit,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MenuItem::Register => "Register new user",
            MenuItem::ToggleStatus => "Toggle user online status",
            MenuItem::CreateRequest => "Create pickup request",
            MenuItem::ListUsers => "List users",
            MenuItem::ListRequests => "List pickup requests",
            MenuItem::CompletePickup => "Complete pickup",
            MenuItem::CompleteNextForCollector => "Complete next pickup for a collector",
            MenuItem::Exit => "Exit",
        }
    }
}

/// Operations that ask for a single numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdPrompt {
    ToggleStatus,
    CreateRequest,
    CompleteRequest,
    CompleteNextForCollector,
}

impl IdPrompt {
    pub(crate) fn title(self) -> &'static str {
        match self {
            IdPrompt::ToggleStatus => "Enter user ID to toggle status",
            IdPrompt::CreateRequest => "Enter waste creator ID",
            IdPrompt::CompleteRequest => "Enter request ID to mark as completed",
            IdPrompt::CompleteNextForCollector => "Enter waste collector ID",
        }
    }

    /// Whether the prompt asks for a request id (and lists requests) rather than a user id.
    pub(crate) fn wants_request_id(self) -> bool {
        matches!(self, IdPrompt::CompleteRequest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Menu,
    Register,
    Prompt(IdPrompt),
    Users,
    Requests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RegisterField {
    #[default]
    Name,
    Phone,
    Location,
    Role,
}

impl RegisterField {
    pub(crate) fn next(self) -> Self {
        match self {
            RegisterField::Name => RegisterField::Phone,
            RegisterField::Phone => RegisterField::Location,
            RegisterField::Location | RegisterField::Role => RegisterField::Role,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            RegisterField::Name | RegisterField::Phone => RegisterField::Name,
            RegisterField::Location => RegisterField::Phone,
            RegisterField::Role => RegisterField::Location,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegisterForm {
    pub name: String,
    pub phone: String,
    pub location: String,
    pub role_index: usize,
    pub focus: RegisterField,
}

impl RegisterForm {
    /// Text buffer of the focused field; `None` while the role selector is focused.
    pub(crate) fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            RegisterField::Name => Some(&mut self.name),
            RegisterField::Phone => Some(&mut self.phone),
            RegisterField::Location => Some(&mut self.location),
            RegisterField::Role => None,
        }
    }

    pub(crate) fn role(&self) -> Role {
        Role::ALL
            .get(self.role_index)
            .copied()
            .unwrap_or(Role::Creator)
    }

    pub(crate) fn next_role(&mut self) {
        self.role_index = (self.role_index + 1) % Role::ALL.len();
    }

    pub(crate) fn previous_role(&mut self) {
        self.role_index = (self.role_index + Role::ALL.len() - 1) % Role::ALL.len();
    }

    pub(crate) fn to_registration(&self) -> Registration {
        Registration::new(
            self.name.as_str(),
            self.phone.as_str(),
            self.location.as_str(),
            self.role(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

pub(crate) struct App {
    pub screen: Screen,
    pub menu_index: usize,

    pub form: RegisterForm,
    pub id_input: String,

    pub users: Vec<User>,
    pub requests: Vec<RequestView>,

    pub is_loading: bool,
    pub status: Option<StatusMessage>,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            screen: Screen::Menu,
            menu_index: 0,
            form: RegisterForm::default(),
            id_input: String::new(),
            users: Vec::new(),
            requests: Vec::new(),
            is_loading: false,
            status: None,
        }
    }

    pub(crate) fn current_menu_item(&self) -> MenuItem {
        MenuItem::ALL
            .get(self.menu_index)
            .copied()
            .unwrap_or(MenuItem::Register)
    }

    pub(crate) fn open_prompt(&mut self, prompt: IdPrompt) {
        self.id_input.clear();
        self.screen = Screen::Prompt(prompt);
    }

    pub(crate) fn open_register_form(&mut self) {
        self.form = RegisterForm::default();
        self.screen = Screen::Register;
    }

    pub(crate) fn back_to_menu(&mut self) {
        self.screen = Screen::Menu;
    }

    /// Parse the id typed into the current prompt.
    pub(crate) fn parsed_id(&self, prompt: IdPrompt) -> Result<i64, String> {
        let noun = if prompt.wants_request_id() {
            "request"
        } else {
            "user"
        };
        self.id_input
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| format!("Invalid {noun} ID: \"{}\"", self.id_input.trim()))
    }

    pub(crate) fn set_info(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Info, text);
    }

    pub(crate) fn set_success(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Success, text);
    }

    pub(crate) fn set_error(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Error, text);
    }

    /// Show a service error; informational outcomes are not rendered as failures.
    pub(crate) fn report(&mut self, err: &ServiceError) {
        if err.is_informational() {
            self.set_info(err.to_string());
        } else {
            self.set_error(err.to_string());
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }
}

pub(crate) fn describe_dispatch(dispatch: &Dispatch) -> String {
    let created = format!("Pickup request created! ID: {}", dispatch.request.id);
    match dispatch.assignment {
        Some(found) => format!(
            "{created} · Found collector (ID: {}) {:.2} km away!",
            found.collector, found.distance_km
        ),
        None => format!("{created} · No available collectors found; the request stays pending."),
    }
}

pub(crate) fn describe_toggle(user: &User) -> String {
    let state = if user.online { "online" } else { "offline" };
    format!("{} (ID: {}) is now {state}", user.name, user.id)
}

pub(crate) fn describe_completion(request: &PickupRequest) -> String {
    format!("Pickup request {} marked as completed!", request.id)
}

#[cfg(test)]
mod tests {
    use abholi_core::model::{
        CollectorMatch, Coordinates, Location, RequestId, RequestStatus, UserId,
    };
    use chrono::Utc;

    use super::*;

    fn request(id: i64, collector: Option<i64>) -> PickupRequest {
        PickupRequest {
            id: RequestId(id),
            creator: UserId(1),
            collector: collector.map(UserId),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn ids_are_validated_at_the_boundary() {
        let mut app = App::new();
        app.open_prompt(IdPrompt::ToggleStatus);

        app.id_input = String::from(" 12 ");
        assert_eq!(app.parsed_id(IdPrompt::ToggleStatus), Ok(12));

        app.id_input = String::from("twelve");
        assert_eq!(
            app.parsed_id(IdPrompt::ToggleStatus),
            Err(String::from("Invalid user ID: \"twelve\""))
        );

        app.id_input = String::from("0");
        assert!(app.parsed_id(IdPrompt::CompleteRequest).is_err());
    }

    #[test]
    fn role_selector_wraps_around() {
        let mut form = RegisterForm::default();
        assert_eq!(form.role(), Role::Creator);
        form.previous_role();
        assert_eq!(form.role(), Role::Recycler);
        form.next_role();
        form.next_role();
        assert_eq!(form.role(), Role::Collector);
    }

    #[test]
    fn dispatch_messages_mention_the_match() {
        let matched = Dispatch {
            request: request(3, Some(2)),
            assignment: Some(CollectorMatch {
                collector: UserId(2),
                distance_km: 111.319_49,
            }),
        };
        assert_eq!(
            describe_dispatch(&matched),
            "Pickup request created! ID: 3 · Found collector (ID: 2) 111.32 km away!"
        );

        let unmatched = Dispatch {
            request: request(4, None),
            assignment: None,
        };
        assert!(describe_dispatch(&unmatched).contains("No available collectors found"));
    }

    #[test]
    fn toggle_message_names_the_new_state() {
        let user = User {
            id: UserId(5),
            name: String::from("Kofi"),
            phone: String::from("+233 24 555 0100"),
            location: Location {
                text: String::from("Kumasi, Ghana"),
                coordinates: Coordinates::new(6.69, -1.62).expect("valid coordinates"),
            },
            role: Role::Collector,
            online: true,
            created_at: Utc::now(),
        };
        assert_eq!(describe_toggle(&user), "Kofi (ID: 5) is now online");
    }

    #[test]
    fn informational_errors_are_not_shown_as_failures() {
        let mut app = App::new();
        app.report(&ServiceError::AlreadyCompleted(RequestId(1)));
        assert_eq!(app.status.map(|status| status.kind), Some(StatusKind::Info));

        let mut app = App::new();
        app.report(&ServiceError::RequestNotFound(RequestId(1)));
        assert_eq!(app.status.map(|status| status.kind), Some(StatusKind::Error));
    }
}
