//! Built-in English messages, the last step of message resolution.

use vela_value::{Date, ValueType};

use crate::issue::{Bound, IssueKind, SizeOrigin, StringValidation, join_values};

pub fn default_message(kind: &IssueKind) -> String {
    match kind {
        IssueKind::InvalidType { received, .. } if *received == ValueType::Undefined => {
            "Required".to_string()
        }
        IssueKind::InvalidType { expected, received } => {
            format!("Expected {expected}, received {received}")
        }
        IssueKind::InvalidLiteral { expected, .. } => {
            format!("Invalid literal value, expected {expected}")
        }
        IssueKind::UnrecognizedKeys { keys } => {
            let keys = keys
                .iter()
                .map(|key| format!("'{key}'"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Unrecognized key(s) in object: {keys}")
        }
        IssueKind::InvalidUnion { .. } => "Invalid input".to_string(),
        IssueKind::InvalidUnionDiscriminator { options } => {
            format!(
                "Invalid discriminator value. Expected {}",
                join_values(options, " | ")
            )
        }
        IssueKind::InvalidEnumValue { options, received } => {
            let received = match received.as_str() {
                Some(s) => s.to_string(),
                None => received.to_js_string(),
            };
            format!(
                "Invalid enum value. Expected {}, received '{received}'",
                join_values(options, " | ")
            )
        }
        IssueKind::InvalidDate => "Invalid date".to_string(),
        IssueKind::InvalidString { validation } => string_message(validation),
        IssueKind::TooSmall {
            minimum,
            inclusive,
            exact,
            origin,
        } => too_small_message(minimum, *inclusive, *exact, *origin),
        IssueKind::TooBig {
            maximum,
            inclusive,
            exact,
            origin,
        } => too_big_message(maximum, *inclusive, *exact, *origin),
        IssueKind::Custom { .. } => "Invalid input".to_string(),
        IssueKind::InvalidIntersectionTypes => {
            "Intersection results could not be merged".to_string()
        }
        IssueKind::NotMultipleOf { multiple_of } => {
            format!("Number must be a multiple of {multiple_of}")
        }
        IssueKind::NotFinite => "Number must be finite".to_string(),
    }
}

fn string_message(validation: &StringValidation) -> String {
    match validation {
        StringValidation::Includes { includes, position } => {
            let mut message = format!("Invalid input: must include \"{includes}\"");
            if let Some(position) = position {
                message.push_str(&format!(
                    " at one or more positions greater than or equal to {position}"
                ));
            }
            message
        }
        StringValidation::StartsWith(prefix) => {
            format!("Invalid input: must start with \"{prefix}\"")
        }
        StringValidation::EndsWith(suffix) => format!("Invalid input: must end with \"{suffix}\""),
        StringValidation::Regex => "Invalid".to_string(),
        other => format!("Invalid {}", other.name()),
    }
}

fn date_bound(bound: &Bound) -> String {
    match bound {
        Bound::Number(millis) => Date::from_millis(*millis).to_string(),
        Bound::BigInt(n) => n.to_string(),
    }
}

fn too_small_message(minimum: &Bound, inclusive: bool, exact: bool, origin: SizeOrigin) -> String {
    match origin {
        SizeOrigin::Array | SizeOrigin::Set => {
            let noun = if origin == SizeOrigin::Array { "Array" } else { "Set" };
            let adverb = if exact {
                "exactly"
            } else if inclusive {
                "at least"
            } else {
                "more than"
            };
            format!("{noun} must contain {adverb} {minimum} element(s)")
        }
        SizeOrigin::String => {
            let adverb = if exact {
                "exactly"
            } else if inclusive {
                "at least"
            } else {
                "over"
            };
            format!("String must contain {adverb} {minimum} character(s)")
        }
        SizeOrigin::Number | SizeOrigin::BigInt => {
            format!("Number must be {}{minimum}", lower_relation(inclusive, exact))
        }
        SizeOrigin::Date => format!(
            "Date must be {}{}",
            lower_relation(inclusive, exact),
            date_bound(minimum)
        ),
    }
}

fn lower_relation(inclusive: bool, exact: bool) -> &'static str {
    if exact {
        "exactly equal to "
    } else if inclusive {
        "greater than or equal to "
    } else {
        "greater than "
    }
}

fn too_big_message(maximum: &Bound, inclusive: bool, exact: bool, origin: SizeOrigin) -> String {
    match origin {
        SizeOrigin::Array | SizeOrigin::Set => {
            let noun = if origin == SizeOrigin::Array { "Array" } else { "Set" };
            let adverb = if exact {
                "exactly"
            } else if inclusive {
                "at most"
            } else {
                "less than"
            };
            format!("{noun} must contain {adverb} {maximum} element(s)")
        }
        SizeOrigin::String => {
            let adverb = if exact {
                "exactly"
            } else if inclusive {
                "at most"
            } else {
                "under"
            };
            format!("String must contain {adverb} {maximum} character(s)")
        }
        SizeOrigin::Number => format!("Number must be {} {maximum}", upper_relation(inclusive, exact)),
        SizeOrigin::BigInt => format!("BigInt must be {} {maximum}", upper_relation(inclusive, exact)),
        SizeOrigin::Date => {
            let relation = if exact {
                "exactly"
            } else if inclusive {
                "smaller than or equal to"
            } else {
                "smaller than"
            };
            format!("Date must be {relation} {}", date_bound(maximum))
        }
    }
}

fn upper_relation(inclusive: bool, exact: bool) -> &'static str {
    if exact {
        "exactly"
    } else if inclusive {
        "less than or equal to"
    } else {
        "less than"
    }
}

#[cfg(test)]
mod tests {
    use vela_value::Value;

    use super::*;
    use crate::issue::Expected;

    #[test]
    fn test_required_for_undefined() {
        let kind = IssueKind::invalid_type(ValueType::String, ValueType::Undefined);
        assert_eq!(default_message(&kind), "Required");
    }

    #[test]
    fn test_invalid_type() {
        let kind = IssueKind::invalid_type(ValueType::String, ValueType::Number);
        assert_eq!(default_message(&kind), "Expected string, received number");
    }

    #[test]
    fn test_enum_expected() {
        let kind = IssueKind::invalid_type(
            Expected::OneOf(vec![Value::from("a"), Value::from("b")]),
            ValueType::Number,
        );
        assert_eq!(default_message(&kind), "Expected 'a' | 'b', received number");
    }

    #[test]
    fn test_string_too_small() {
        let kind = IssueKind::too_small(5usize, true, SizeOrigin::String);
        assert_eq!(
            default_message(&kind),
            "String must contain at least 5 character(s)"
        );
    }

    #[test]
    fn test_number_too_big_exclusive() {
        let kind = IssueKind::too_big(10.0, false, SizeOrigin::Number);
        assert_eq!(default_message(&kind), "Number must be less than 10");
    }

    #[test]
    fn test_multiple_of() {
        let kind = IssueKind::NotMultipleOf {
            multiple_of: Bound::Number(0.1),
        };
        assert_eq!(default_message(&kind), "Number must be a multiple of 0.1");
    }

    #[test]
    fn test_discriminator() {
        let kind = IssueKind::InvalidUnionDiscriminator {
            options: vec![Value::from("a"), Value::from("b")],
        };
        assert_eq!(
            default_message(&kind),
            "Invalid discriminator value. Expected 'a' | 'b'"
        );
    }

    #[test]
    fn test_includes_with_position() {
        let kind = IssueKind::InvalidString {
            validation: StringValidation::Includes {
                includes: "x".to_string(),
                position: Some(2),
            },
        };
        assert_eq!(
            default_message(&kind),
            "Invalid input: must include \"x\" at one or more positions greater than or equal to 2"
        );
    }

    #[test]
    fn test_unrecognized_keys() {
        let kind = IssueKind::UnrecognizedKeys {
            keys: vec!["b".to_string(), "c".to_string()],
        };
        assert_eq!(
            default_message(&kind),
            "Unrecognized key(s) in object: 'b', 'c'"
        );
    }
}
