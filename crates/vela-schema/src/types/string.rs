use std::net::Ipv6Addr;
use std::sync::LazyLock;

use regex::Regex;
use vela_value::{Value, ValueType};

use crate::context::ParseContext;
use crate::error::SchemaError;
use crate::issue::{IssueData, IssueKind, SizeOrigin, StringValidation};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn, Status};

use super::primitive::reject_type;

// =============================================================================
// Formats
// =============================================================================

static CUID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^c[^\s-]{8,}$").expect("valid cuid regex"));

static CUID2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-z]+$").expect("valid cuid2 regex"));

static ULID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9A-HJKMNP-TV-Z]{26}$").expect("valid ulid regex"));

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid uuid regex")
});

static NANOID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_-]{21}$").expect("valid nanoid regex"));

// Leading dots and consecutive dots are rejected separately.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("valid email regex")
});

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\p{Extended_Pictographic}|\p{Emoji_Component})+$").expect("valid emoji regex")
});

const IPV4_SOURCE: &str = r"(?:(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])";

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{IPV4_SOURCE}$")).expect("valid ipv4 regex"));

static IPV4_CIDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{IPV4_SOURCE}/(3[0-2]|[12]?[0-9])$")).expect("valid ipv4 cidr regex")
});

static BASE64: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-zA-Z+/]{4})*(([0-9a-zA-Z+/]{2}==)|([0-9a-zA-Z+/]{3}=))?$")
        .expect("valid base64 regex")
});

static BASE64URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-zA-Z\-_]{4})*(([0-9a-zA-Z\-_]{2}(==)?)|([0-9a-zA-Z\-_]{3}(=)?))?$")
        .expect("valid base64url regex")
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?:[0-9][0-9][2468][048]|[0-9][0-9][13579][26]|[0-9][0-9]0[48]|[02468][048]00|[13579][26]00)-02-29",
        r"|[0-9]{4}-(?:(?:0[13578]|1[02])-(?:0[1-9]|[12][0-9]|3[01])|(?:0[469]|11)-(?:0[1-9]|[12][0-9]|30)|02-(?:0[1-9]|1[0-9]|2[0-8])))$",
    ))
    .expect("valid date regex")
});

static TIME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]").expect("valid time regex")
});

static OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-][0-9]{2}:?[0-9]{2}$").expect("valid offset regex"));

// An empty body after `P` and a `T` not followed by a component are
// rejected separately.
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[-+]?P",
        r"(?:(?:[-+]?[0-9]+Y)|(?:[-+]?[0-9]+[.,][0-9]+Y$))?",
        r"(?:(?:[-+]?[0-9]+M)|(?:[-+]?[0-9]+[.,][0-9]+M$))?",
        r"(?:(?:[-+]?[0-9]+W)|(?:[-+]?[0-9]+[.,][0-9]+W$))?",
        r"(?:(?:[-+]?[0-9]+D)|(?:[-+]?[0-9]+[.,][0-9]+D$))?",
        r"(?:T",
        r"(?:(?:[-+]?[0-9]+H)|(?:[-+]?[0-9]+[.,][0-9]+H$))?",
        r"(?:(?:[-+]?[0-9]+M)|(?:[-+]?[0-9]+[.,][0-9]+M$))?",
        r"(?:[-+]?[0-9]+(?:[.,][0-9]+)?S)?",
        r")??$",
    ))
    .expect("valid duration regex")
});

fn is_email(text: &str) -> bool {
    !text.starts_with('.') && !text.contains("..") && EMAIL.is_match(text)
}

fn is_duration(text: &str) -> bool {
    let body = text.trim_start_matches(['-', '+']);
    let Some(body) = body.strip_prefix('P') else {
        return false;
    };
    if body.is_empty() {
        return false;
    }
    if let Some((_, time)) = body.split_once('T')
        && !time.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-')
    {
        return false;
    }
    DURATION.is_match(text)
}

/// Consumes `HH:MM:SS[.fff]` from the start of `text` and returns the rest.
fn strip_time(text: &str, precision: Option<u8>) -> Option<&str> {
    let rest = &text[TIME_PREFIX.find(text)?.end()..];
    match precision {
        Some(0) => Some(rest),
        Some(digits) => {
            let fraction = rest.strip_prefix('.')?;
            let digits = usize::from(digits);
            let all_digits = fraction
                .as_bytes()
                .get(..digits)
                .is_some_and(|head| head.iter().all(u8::is_ascii_digit));
            all_digits.then(|| &fraction[digits..])
        }
        None => match rest.strip_prefix('.') {
            Some(fraction) => {
                let count = fraction.bytes().take_while(u8::is_ascii_digit).count();
                (count > 0).then(|| &fraction[count..])
            }
            None => Some(rest),
        },
    }
}

fn is_time(text: &str, options: &TimeOptions) -> bool {
    strip_time(text, options.precision) == Some("")
}

fn is_datetime(text: &str, options: &DatetimeOptions) -> bool {
    let Some((date, time)) = text.split_once('T') else {
        return false;
    };
    if !DATE.is_match(date) {
        return false;
    }
    let Some(zone) = strip_time(time, options.precision) else {
        return false;
    };
    zone == "Z" || (options.local && zone.is_empty()) || (options.offset && OFFSET.is_match(zone))
}

fn is_ip(text: &str, version: Option<IpVersion>) -> bool {
    let v4 = || IPV4.is_match(text);
    let v6 = || text.parse::<Ipv6Addr>().is_ok();
    match version {
        Some(IpVersion::V4) => v4(),
        Some(IpVersion::V6) => v6(),
        None => v4() || v6(),
    }
}

fn is_cidr(text: &str, version: Option<IpVersion>) -> bool {
    let v4 = || IPV4_CIDR.is_match(text);
    let v6 = || {
        let Some((address, prefix)) = text.split_once('/') else {
            return false;
        };
        let prefix_ok = !prefix.is_empty()
            && prefix.len() <= 3
            && prefix.bytes().all(|b| b.is_ascii_digit())
            && prefix.parse::<u8>().is_ok_and(|bits| bits <= 128);
        prefix_ok && address.parse::<Ipv6Addr>().is_ok()
    };
    match version {
        Some(IpVersion::V4) => v4(),
        Some(IpVersion::V6) => v6(),
        None => v4() || v6(),
    }
}

// =============================================================================
// StringSchema
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatetimeOptions {
    /// Exact number of fractional second digits; `None` allows any.
    pub precision: Option<u8>,
    /// Accept `+HH:MM` style offsets besides `Z`.
    pub offset: bool,
    /// Accept timestamps without any zone designator.
    pub local: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeOptions {
    pub precision: Option<u8>,
}

#[derive(Debug, Clone)]
enum StringCheckKind {
    Min(usize),
    Max(usize),
    Length(usize),
    Email,
    Url,
    Emoji,
    Uuid,
    Nanoid,
    Cuid,
    Cuid2,
    Ulid,
    Regex(Regex),
    Includes {
        value: String,
        position: Option<usize>,
    },
    StartsWith(String),
    EndsWith(String),
    Datetime(DatetimeOptions),
    Date,
    Time(TimeOptions),
    Duration,
    Ip(Option<IpVersion>),
    Cidr(Option<IpVersion>),
    Base64,
    Base64Url,
    Trim,
    ToLowerCase,
    ToUpperCase,
}

#[derive(Debug, Clone)]
struct StringCheck {
    kind: StringCheckKind,
    message: Option<String>,
}

/// Accepts strings. Checks and in-place transforms run in the order they
/// were added.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    checks: Vec<StringCheck>,
    coerce: bool,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the input to its string form before checking it.
    pub fn coerced() -> Self {
        Self {
            coerce: true,
            ..Self::default()
        }
    }

    fn with_check(&self, kind: StringCheckKind) -> Self {
        let mut schema = self.clone();
        schema.checks.push(StringCheck {
            kind,
            message: None,
        });
        schema
    }

    /// At least `len` characters.
    pub fn min(&self, len: usize) -> Self {
        self.with_check(StringCheckKind::Min(len))
    }

    /// At most `len` characters.
    pub fn max(&self, len: usize) -> Self {
        self.with_check(StringCheckKind::Max(len))
    }

    /// Exactly `len` characters.
    pub fn length(&self, len: usize) -> Self {
        self.with_check(StringCheckKind::Length(len))
    }

    pub fn nonempty(&self) -> Self {
        self.min(1)
    }

    pub fn email(&self) -> Self {
        self.with_check(StringCheckKind::Email)
    }

    pub fn url(&self) -> Self {
        self.with_check(StringCheckKind::Url)
    }

    pub fn emoji(&self) -> Self {
        self.with_check(StringCheckKind::Emoji)
    }

    pub fn uuid(&self) -> Self {
        self.with_check(StringCheckKind::Uuid)
    }

    pub fn nanoid(&self) -> Self {
        self.with_check(StringCheckKind::Nanoid)
    }

    pub fn cuid(&self) -> Self {
        self.with_check(StringCheckKind::Cuid)
    }

    pub fn cuid2(&self) -> Self {
        self.with_check(StringCheckKind::Cuid2)
    }

    pub fn ulid(&self) -> Self {
        self.with_check(StringCheckKind::Ulid)
    }

    pub fn regex(&self, regex: Regex) -> Self {
        self.with_check(StringCheckKind::Regex(regex))
    }

    /// Like [`regex`](Self::regex), compiling `pattern` first.
    pub fn pattern(&self, pattern: &str) -> Result<Self, SchemaError> {
        Ok(self.regex(Regex::new(pattern)?))
    }

    pub fn includes(&self, value: impl Into<String>) -> Self {
        self.with_check(StringCheckKind::Includes {
            value: value.into(),
            position: None,
        })
    }

    /// `value` must occur at or after character `position`.
    pub fn includes_at(&self, value: impl Into<String>, position: usize) -> Self {
        self.with_check(StringCheckKind::Includes {
            value: value.into(),
            position: Some(position),
        })
    }

    pub fn starts_with(&self, prefix: impl Into<String>) -> Self {
        self.with_check(StringCheckKind::StartsWith(prefix.into()))
    }

    pub fn ends_with(&self, suffix: impl Into<String>) -> Self {
        self.with_check(StringCheckKind::EndsWith(suffix.into()))
    }

    /// ISO 8601 timestamp in UTC (`Z`).
    pub fn datetime(&self) -> Self {
        self.datetime_with(DatetimeOptions::default())
    }

    pub fn datetime_with(&self, options: DatetimeOptions) -> Self {
        self.with_check(StringCheckKind::Datetime(options))
    }

    /// `YYYY-MM-DD` calendar date.
    pub fn date(&self) -> Self {
        self.with_check(StringCheckKind::Date)
    }

    /// `HH:MM:SS[.fff]` time of day.
    pub fn time(&self) -> Self {
        self.time_with(TimeOptions::default())
    }

    pub fn time_with(&self, options: TimeOptions) -> Self {
        self.with_check(StringCheckKind::Time(options))
    }

    /// ISO 8601 duration.
    pub fn duration(&self) -> Self {
        self.with_check(StringCheckKind::Duration)
    }

    /// IPv4 or IPv6 address.
    pub fn ip(&self) -> Self {
        self.with_check(StringCheckKind::Ip(None))
    }

    pub fn ip_version(&self, version: IpVersion) -> Self {
        self.with_check(StringCheckKind::Ip(Some(version)))
    }

    pub fn cidr(&self) -> Self {
        self.with_check(StringCheckKind::Cidr(None))
    }

    pub fn cidr_version(&self, version: IpVersion) -> Self {
        self.with_check(StringCheckKind::Cidr(Some(version)))
    }

    pub fn base64(&self) -> Self {
        self.with_check(StringCheckKind::Base64)
    }

    pub fn base64url(&self) -> Self {
        self.with_check(StringCheckKind::Base64Url)
    }

    /// Trims surrounding whitespace before the following checks.
    pub fn trim(&self) -> Self {
        self.with_check(StringCheckKind::Trim)
    }

    pub fn to_lowercase(&self) -> Self {
        self.with_check(StringCheckKind::ToLowerCase)
    }

    pub fn to_uppercase(&self) -> Self {
        self.with_check(StringCheckKind::ToUpperCase)
    }

    /// Sets the message of the most recently added check.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let mut schema = self.clone();
        if let Some(check) = schema.checks.last_mut() {
            check.message = Some(message.into());
        }
        schema
    }

    /// The tightest lower length bound.
    pub fn min_length(&self) -> Option<usize> {
        self.checks
            .iter()
            .filter_map(|check| match check.kind {
                StringCheckKind::Min(len) | StringCheckKind::Length(len) => Some(len),
                _ => None,
            })
            .max()
    }

    /// The tightest upper length bound.
    pub fn max_length(&self) -> Option<usize> {
        self.checks
            .iter()
            .filter_map(|check| match check.kind {
                StringCheckKind::Max(len) | StringCheckKind::Length(len) => Some(len),
                _ => None,
            })
            .min()
    }
}

fn invalid(validation: StringValidation) -> Option<IssueKind> {
    Some(IssueKind::InvalidString { validation })
}

fn unless(ok: bool, validation: StringValidation) -> Option<IssueKind> {
    if ok { None } else { invalid(validation) }
}

impl TypeParser for StringSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let input = if self.coerce {
            Value::String(input.to_js_string())
        } else {
            input
        };
        let mut text = match input {
            Value::String(text) => text,
            other => return reject_type(other, ctx, ValueType::String),
        };

        let mut status = Status::Valid;
        for check in &self.checks {
            let len = || text.chars().count();
            let failure = match &check.kind {
                StringCheckKind::Min(min) => (len() < *min)
                    .then(|| IssueKind::too_small(*min, true, SizeOrigin::String)),
                StringCheckKind::Max(max) => (len() > *max)
                    .then(|| IssueKind::too_big(*max, true, SizeOrigin::String)),
                StringCheckKind::Length(exact) => {
                    let len = len();
                    if len > *exact {
                        Some(IssueKind::TooBig {
                            maximum: (*exact).into(),
                            inclusive: true,
                            exact: true,
                            origin: SizeOrigin::String,
                        })
                    } else if len < *exact {
                        Some(IssueKind::TooSmall {
                            minimum: (*exact).into(),
                            inclusive: true,
                            exact: true,
                            origin: SizeOrigin::String,
                        })
                    } else {
                        None
                    }
                }
                StringCheckKind::Email => unless(is_email(&text), StringValidation::Email),
                StringCheckKind::Url => {
                    unless(url::Url::parse(&text).is_ok(), StringValidation::Url)
                }
                StringCheckKind::Emoji => unless(EMOJI.is_match(&text), StringValidation::Emoji),
                StringCheckKind::Uuid => unless(UUID.is_match(&text), StringValidation::Uuid),
                StringCheckKind::Nanoid => {
                    unless(NANOID.is_match(&text), StringValidation::Nanoid)
                }
                StringCheckKind::Cuid => unless(CUID.is_match(&text), StringValidation::Cuid),
                StringCheckKind::Cuid2 => unless(CUID2.is_match(&text), StringValidation::Cuid2),
                StringCheckKind::Ulid => unless(ULID.is_match(&text), StringValidation::Ulid),
                StringCheckKind::Regex(regex) => {
                    unless(regex.is_match(&text), StringValidation::Regex)
                }
                StringCheckKind::Includes { value, position } => {
                    let haystack = match position {
                        Some(position) => text
                            .char_indices()
                            .nth(*position)
                            .map_or("", |(offset, _)| &text[offset..]),
                        None => text.as_str(),
                    };
                    unless(
                        haystack.contains(value.as_str()),
                        StringValidation::Includes {
                            includes: value.clone(),
                            position: *position,
                        },
                    )
                }
                StringCheckKind::StartsWith(prefix) => unless(
                    text.starts_with(prefix.as_str()),
                    StringValidation::StartsWith(prefix.clone()),
                ),
                StringCheckKind::EndsWith(suffix) => unless(
                    text.ends_with(suffix.as_str()),
                    StringValidation::EndsWith(suffix.clone()),
                ),
                StringCheckKind::Datetime(options) => {
                    unless(is_datetime(&text, options), StringValidation::Datetime)
                }
                StringCheckKind::Date => unless(DATE.is_match(&text), StringValidation::Date),
                StringCheckKind::Time(options) => {
                    unless(is_time(&text, options), StringValidation::Time)
                }
                StringCheckKind::Duration => {
                    unless(is_duration(&text), StringValidation::Duration)
                }
                StringCheckKind::Ip(version) => unless(is_ip(&text, *version), StringValidation::Ip),
                StringCheckKind::Cidr(version) => {
                    unless(is_cidr(&text, *version), StringValidation::Cidr)
                }
                StringCheckKind::Base64 => {
                    unless(BASE64.is_match(&text), StringValidation::Base64)
                }
                StringCheckKind::Base64Url => {
                    unless(BASE64URL.is_match(&text), StringValidation::Base64Url)
                }
                StringCheckKind::Trim => {
                    text = text.trim().to_string();
                    None
                }
                StringCheckKind::ToLowerCase => {
                    text = text.to_lowercase();
                    None
                }
                StringCheckKind::ToUpperCase => {
                    text = text.to_uppercase();
                    None
                }
            };
            if let Some(kind) = failure {
                ctx.add_issue(
                    &Value::String(text.clone()),
                    IssueData::new(kind).with_message_opt(check.message.clone()),
                );
                status.dirty();
            }
        }
        ParseReturn::Ready(ParseResult::with_status(status, Value::String(text)))
    }
}

impl From<StringSchema> for Schema {
    fn from(schema: StringSchema) -> Self {
        Schema::new(SchemaKind::String(schema))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::issue::IssueCode;
    use crate::{SchemaExt, coerce, string};

    fn messages(schema: &StringSchema, input: &str) -> Vec<String> {
        match schema.safe_parse(input).unwrap().error() {
            Some(error) => error.issues().iter().map(|issue| issue.message.clone()).collect(),
            None => vec![],
        }
    }

    fn accepts(schema: &StringSchema, input: &str) -> bool {
        schema.safe_parse(input).unwrap().is_success()
    }

    #[test]
    fn test_all_checks_reported() {
        let schema = string().min(5).regex(Regex::new("^[a-z]+$").unwrap());
        let outcome = schema.safe_parse("AB").unwrap();
        let codes: Vec<_> = outcome
            .error()
            .unwrap()
            .issues()
            .iter()
            .map(|issue| issue.code())
            .collect();
        assert_eq!(codes, vec![IssueCode::TooSmall, IssueCode::InvalidString]);
    }

    #[test]
    fn test_length_messages() {
        assert_eq!(
            messages(&string().min(5), "abc"),
            vec!["String must contain at least 5 character(s)".to_string()]
        );
        assert_eq!(
            messages(&string().length(2), "abc"),
            vec!["String must contain exactly 2 character(s)".to_string()]
        );
    }

    #[test]
    fn test_length_counts_chars() {
        assert!(accepts(&string().max(2), "日本"));
    }

    #[test]
    fn test_email() {
        let schema = string().email();
        assert!(accepts(&schema, "user.name+tag@example.co.uk"));
        assert!(!accepts(&schema, ".user@example.com"));
        assert!(!accepts(&schema, "a..b@example.com"));
        assert!(!accepts(&schema, "user@localhost"));
        assert_eq!(messages(&schema, "nope"), vec!["Invalid email".to_string()]);
    }

    #[test]
    fn test_url() {
        assert!(accepts(&string().url(), "https://example.com/path?q=1"));
        assert!(!accepts(&string().url(), "not a url"));
    }

    #[test]
    fn test_identifiers() {
        assert!(accepts(&string().uuid(), "123e4567-e89b-12d3-a456-426614174000"));
        assert!(!accepts(&string().uuid(), "123e4567"));
        assert!(accepts(&string().cuid(), "cjld2cjxh0000qzrmn831i7rn"));
        assert!(accepts(&string().ulid(), "01ARZ3NDEKTSV4RRFFQ69G5FAV"));
        assert!(accepts(&string().nanoid(), "V1StGXR8_Z5jdHi6B-myT"));
        assert!(!accepts(&string().cuid2(), "ABC"));
    }

    #[test]
    fn test_datetime() {
        let schema = string().datetime();
        assert!(accepts(&schema, "2020-01-01T00:00:00Z"));
        assert!(accepts(&schema, "2020-01-01T00:00:00.123Z"));
        assert!(!accepts(&schema, "2020-01-01T00:00:00+02:00"));
        assert!(!accepts(&schema, "2020-01-01T00:00:00"));

        let offset = string().datetime_with(DatetimeOptions {
            offset: true,
            ..DatetimeOptions::default()
        });
        assert!(accepts(&offset, "2020-01-01T00:00:00+02:00"));

        let local = string().datetime_with(DatetimeOptions {
            local: true,
            ..DatetimeOptions::default()
        });
        assert!(accepts(&local, "2020-01-01T00:00:00"));

        let precise = string().datetime_with(DatetimeOptions {
            precision: Some(3),
            ..DatetimeOptions::default()
        });
        assert!(accepts(&precise, "2020-01-01T00:00:00.123Z"));
        assert!(!accepts(&precise, "2020-01-01T00:00:00.1Z"));
        assert!(!accepts(&precise, "2020-01-01T00:00:00Z"));
    }

    #[test]
    fn test_date_and_time() {
        assert!(accepts(&string().date(), "2024-02-29"));
        assert!(!accepts(&string().date(), "2023-02-29"));
        assert!(accepts(&string().time(), "23:59:59.5"));
        assert!(!accepts(&string().time(), "24:00:00"));
        let whole = string().time_with(TimeOptions { precision: Some(0) });
        assert!(!accepts(&whole, "12:00:00.1"));
    }

    #[test]
    fn test_duration() {
        let schema = string().duration();
        assert!(accepts(&schema, "P3Y6M4DT12H30M5S"));
        assert!(accepts(&schema, "PT0.5S"));
        assert!(!accepts(&schema, "P"));
        assert!(!accepts(&schema, "PT"));
        assert!(!accepts(&schema, "3Y"));
    }

    #[test]
    fn test_ip_and_cidr() {
        assert!(accepts(&string().ip(), "192.168.0.1"));
        assert!(accepts(&string().ip(), "::1"));
        assert!(!accepts(&string().ip_version(IpVersion::V4), "::1"));
        assert!(!accepts(&string().ip(), "256.0.0.1"));
        assert!(accepts(&string().cidr(), "10.0.0.0/8"));
        assert!(accepts(&string().cidr(), "2001:db8::/32"));
        assert!(!accepts(&string().cidr(), "10.0.0.0/33"));
    }

    #[test]
    fn test_base64() {
        assert!(accepts(&string().base64(), "aGVsbG8="));
        assert!(!accepts(&string().base64(), "aGVsbG8"));
        assert!(accepts(&string().base64url(), "aGVsbG8"));
    }

    #[test]
    fn test_emoji() {
        assert!(accepts(&string().emoji(), "😀👍"));
        assert!(!accepts(&string().emoji(), "abc"));
    }

    #[test]
    fn test_includes_position() {
        assert!(accepts(&string().includes_at("b", 1), "abc"));
        assert!(!accepts(&string().includes_at("a", 1), "abc"));
        assert!(!accepts(&string().starts_with("x"), "abc"));
        assert!(accepts(&string().ends_with("bc"), "abc"));
    }

    #[test]
    fn test_transforms_apply_in_order() {
        let schema = string().trim().to_lowercase().min(3);
        assert_eq!(schema.parse("  ABC ").unwrap(), Value::from("abc"));
        assert!(!accepts(&string().trim().min(3), "  a  "));
    }

    #[test]
    fn test_pattern_error() {
        assert!(matches!(string().pattern("("), Err(SchemaError::InvalidRegex(_))));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce::string().parse(12).unwrap(), Value::from("12"));
        assert_eq!(coerce::string().parse(true).unwrap(), Value::from("true"));
    }

    #[test]
    fn test_bounds_introspection() {
        let schema = string().min(2).max(8).length(5);
        assert_eq!(schema.min_length(), Some(5));
        assert_eq!(schema.max_length(), Some(5));
    }
}
