//! Provider-neutral notification envelopes and the builders that produce them.
//!
//! Builders are pure: they validate their inputs, compose the title, body and
//! data map for one [`NotificationKind`], and never touch I/O.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::Amount;

/// Topic receiving new-order notifications.
pub const ORDER_TOPIC: &str = "admin_orders";
/// Topic receiving new-user notifications.
pub const NEW_USER_TOPIC: &str = "admin_new_users";

const ORDER_TITLE: &str = "🎉 New Order Received!";
const NEW_USER_TITLE: &str = "👤 New User Registered";

/// Data key carrying the order identifier.
pub const DATA_ORDER_ID: &str = "orderId";
/// Data key carrying the registered user's email.
pub const DATA_EMAIL: &str = "email";
/// Data key carrying the notification type tag.
pub const DATA_TYPE: &str = "type";

/// Validation failures raised while building an envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeValidationError {
    /// The order identifier is empty once trimmed.
    #[error("order id must not be empty")]
    EmptyOrderId,
    /// No amount text was supplied.
    #[error("amount must not be empty")]
    EmptyAmount,
    /// The amount text is not a plain decimal number.
    #[error("amount '{value}' is not a decimal number")]
    MalformedAmount {
        /// Rejected input.
        value: String,
    },
    /// The amount is zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    /// The amount carries more fractional digits than the currency allows.
    #[error("amount must have at most {max_fraction_digits} fractional digits")]
    AmountTooPrecise {
        /// Largest accepted number of fractional digits.
        max_fraction_digits: usize,
    },
    /// The amount does not fit the supported range.
    #[error("amount is too large")]
    AmountOutOfRange,
    /// A required name field is empty once trimmed.
    #[error("{field} must not be empty")]
    EmptyName {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The email address is empty once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The email address is not of the form `local@domain.tld`.
    #[error("email '{value}' is not a valid address")]
    MalformedEmail {
        /// Rejected input.
        value: String,
    },
}

/// Closed set of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A customer placed an order.
    NewOrder,
    /// A user registered an account.
    NewUser,
}

impl NotificationKind {
    /// Delivery topic owned by this kind.
    #[must_use]
    pub const fn topic(self) -> &'static str {
        match self {
            Self::NewOrder => ORDER_TOPIC,
            Self::NewUser => NEW_USER_TOPIC,
        }
    }

    /// Value of the `type` data entry for this kind.
    #[must_use]
    pub const fn data_type(self) -> &'static str {
        match self {
            Self::NewOrder => "order",
            Self::NewUser => "user",
        }
    }

    /// Stable snake-case label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewOrder => "new_order",
            Self::NewUser => "new_user",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order identifier rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    /// Validate and construct an order identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeValidationError::EmptyOrderId`] for blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, EnvelopeValidationError> {
        let id = id.into().trim().to_owned();
        if id.is_empty() {
            return Err(EnvelopeValidationError::EmptyOrderId);
        }
        Ok(Self(id))
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Non-empty person name (customer or registering user).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name, naming `field` in the error when it is blank.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeValidationError::EmptyName`] for blank input.
    pub fn new(
        name: impl Into<String>,
        field: &'static str,
    ) -> Result<Self, EnvelopeValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(EnvelopeValidationError::EmptyName { field });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Syntactically plausible email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeValidationError::EmptyEmail`] for blank input and
    /// [`EnvelopeValidationError::MalformedEmail`] when the text is not of the
    /// form `local@domain.tld`.
    pub fn new(email: impl Into<String>) -> Result<Self, EnvelopeValidationError> {
        let email = email.into().trim().to_owned();
        if email.is_empty() {
            return Err(EnvelopeValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&email) {
            return Err(EnvelopeValidationError::MalformedEmail { value: email });
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Fully validated description of one notification.
///
/// ## Invariants
/// - `title`, `body` and `topic` are non-empty.
/// - `data` holds at least the `type` entry and every value is text.
/// - Only the builders in this module construct envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEnvelope {
    kind: NotificationKind,
    title: String,
    body: String,
    data: BTreeMap<String, String>,
}

impl NotificationEnvelope {
    fn assemble(
        kind: NotificationKind,
        title: &str,
        body: String,
        entries: [(&str, String); 1],
    ) -> Self {
        let mut data: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value))
            .collect();
        data.insert(DATA_TYPE.to_owned(), kind.data_type().to_owned());
        Self {
            kind,
            title: title.to_owned(),
            body,
            data,
        }
    }

    /// Kind this envelope was built for.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Human-readable body.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Structured string data delivered alongside the notification.
    #[must_use]
    pub const fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Delivery topic.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        self.kind.topic()
    }
}

/// Build the envelope announcing a new order.
///
/// # Examples
/// ```
/// use notifier::domain::{build_order_envelope, Amount};
///
/// let amount: Amount = "499.00".parse().expect("valid amount");
/// let envelope = build_order_envelope(1024, amount, "Asha").expect("valid order");
/// assert_eq!(envelope.topic(), "admin_orders");
/// assert_eq!(envelope.body(), "Order #1024 from Asha for ₹499.00");
/// ```
///
/// # Errors
///
/// Returns [`EnvelopeValidationError`] when the order id or customer name is
/// blank.
pub fn build_order_envelope(
    order_id: impl fmt::Display,
    amount: Amount,
    customer_name: &str,
) -> Result<NotificationEnvelope, EnvelopeValidationError> {
    let order_id = OrderId::new(order_id.to_string())?;
    let customer = PersonName::new(customer_name, "customer name")?;
    let body = format!("Order #{order_id} from {customer} for ₹{amount}");
    Ok(NotificationEnvelope::assemble(
        NotificationKind::NewOrder,
        ORDER_TITLE,
        body,
        [(DATA_ORDER_ID, order_id.to_string())],
    ))
}

/// Build the envelope announcing a newly registered user.
///
/// # Examples
/// ```
/// use notifier::domain::build_user_envelope;
///
/// let envelope = build_user_envelope("Rohan", "rohan@example.com").expect("valid user");
/// assert_eq!(envelope.topic(), "admin_new_users");
/// assert_eq!(envelope.data()["email"], "rohan@example.com");
/// ```
///
/// # Errors
///
/// Returns [`EnvelopeValidationError`] when the name is blank or the email is
/// blank or malformed.
pub fn build_user_envelope(
    user_name: &str,
    user_email: &str,
) -> Result<NotificationEnvelope, EnvelopeValidationError> {
    let name = PersonName::new(user_name, "user name")?;
    let email = EmailAddress::new(user_email)?;
    let body = format!("{name} just joined.");
    Ok(NotificationEnvelope::assemble(
        NotificationKind::NewUser,
        NEW_USER_TITLE,
        body,
        [(DATA_EMAIL, email.to_string())],
    ))
}

#[cfg(test)]
mod tests;
