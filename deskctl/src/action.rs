//! The validated request vocabulary for the `computer` tool.
//!
//! [`Action::parse`] is the single place tool-call arguments are checked,
//! so an executor holding an [`Action`] value never re-validates shape.
//! Parameter validation is deliberately explicit rather than serde-derived:
//! the wire format both requires fields per variant and *forbids* the
//! other variant's fields, which a tagged derive cannot express.

use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MouseMove { x: u32, y: u32 },
    LeftClickDrag { x: u32, y: u32 },
    Key { text: String },
    Type { text: String },
    LeftClick,
    RightClick,
    MiddleClick,
    DoubleClick,
    Screenshot,
    CursorPosition,
}

impl Action {
    /// Parses `{ "action": ..., "coordinate": ..., "text": ... }` arguments.
    ///
    /// Every rejection is an [`Error::InvalidArgument`] raised before any
    /// external command runs.
    pub fn parse(args: &Value) -> Result<Action> {
        let action = args
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidArgument("Missing or invalid field: action".into()))?;

        match action {
            "mouse_move" => {
                let (x, y) = require_coordinate(args, action)?;
                Ok(Action::MouseMove { x, y })
            }
            "left_click_drag" => {
                let (x, y) = require_coordinate(args, action)?;
                Ok(Action::LeftClickDrag { x, y })
            }
            "key" => Ok(Action::Key {
                text: require_text(args, action)?,
            }),
            "type" => Ok(Action::Type {
                text: require_text(args, action)?,
            }),
            "left_click" => require_bare(args, action).map(|_| Action::LeftClick),
            "right_click" => require_bare(args, action).map(|_| Action::RightClick),
            "middle_click" => require_bare(args, action).map(|_| Action::MiddleClick),
            "double_click" => require_bare(args, action).map(|_| Action::DoubleClick),
            "screenshot" => require_bare(args, action).map(|_| Action::Screenshot),
            "cursor_position" => require_bare(args, action).map(|_| Action::CursorPosition),
            other => Err(Error::InvalidArgument(format!("Invalid action: {other}"))),
        }
    }

    /// Wire name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Action::MouseMove { .. } => "mouse_move",
            Action::LeftClickDrag { .. } => "left_click_drag",
            Action::Key { .. } => "key",
            Action::Type { .. } => "type",
            Action::LeftClick => "left_click",
            Action::RightClick => "right_click",
            Action::MiddleClick => "middle_click",
            Action::DoubleClick => "double_click",
            Action::Screenshot => "screenshot",
            Action::CursorPosition => "cursor_position",
        }
    }
}

fn require_coordinate(args: &Value, action: &str) -> Result<(u32, u32)> {
    if args.get("text").is_some() {
        return Err(Error::InvalidArgument(format!(
            "text is not accepted for {action}"
        )));
    }
    let coordinate = args.get("coordinate").ok_or_else(|| {
        Error::InvalidArgument(format!("coordinate is required for {action}"))
    })?;
    let pair = coordinate
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| {
            Error::InvalidArgument("coordinate must be an array of length 2".into())
        })?;
    Ok((coordinate_value(&pair[0])?, coordinate_value(&pair[1])?))
}

fn coordinate_value(item: &Value) -> Result<u32> {
    item.as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            Error::InvalidArgument("coordinate must contain non-negative integers".into())
        })
}

fn require_text(args: &Value, action: &str) -> Result<String> {
    if args.get("coordinate").is_some() {
        return Err(Error::InvalidArgument(format!(
            "coordinate is not accepted for {action}"
        )));
    }
    let text = args
        .get("text")
        .ok_or_else(|| Error::InvalidArgument(format!("text is required for {action}")))?;
    text.as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidArgument("text must be a string".into()))
}

fn require_bare(args: &Value, action: &str) -> Result<()> {
    if args.get("text").is_some() {
        return Err(Error::InvalidArgument(format!(
            "text is not accepted for {action}"
        )));
    }
    if args.get("coordinate").is_some() {
        return Err(Error::InvalidArgument(format!(
            "coordinate is not accepted for {action}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_wire_name() {
        let cases = [
            (json!({"action": "mouse_move", "coordinate": [3, 4]}), Action::MouseMove { x: 3, y: 4 }),
            (json!({"action": "left_click_drag", "coordinate": [0, 0]}), Action::LeftClickDrag { x: 0, y: 0 }),
            (json!({"action": "key", "text": "enter"}), Action::Key { text: "enter".into() }),
            (json!({"action": "type", "text": "hi"}), Action::Type { text: "hi".into() }),
            (json!({"action": "left_click"}), Action::LeftClick),
            (json!({"action": "right_click"}), Action::RightClick),
            (json!({"action": "middle_click"}), Action::MiddleClick),
            (json!({"action": "double_click"}), Action::DoubleClick),
            (json!({"action": "screenshot"}), Action::Screenshot),
            (json!({"action": "cursor_position"}), Action::CursorPosition),
        ];
        for (args, expected) in cases {
            let action = Action::parse(&args).unwrap();
            assert_eq!(action, expected);
            assert_eq!(action.name(), args["action"].as_str().unwrap());
        }
    }

    #[test]
    fn missing_action_is_rejected() {
        let err = Action::parse(&json!({"coordinate": [1, 2]})).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = Action::parse(&json!({"action": "triple_click"})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: Invalid action: triple_click");
    }

    #[test]
    fn mouse_move_requires_coordinate() {
        let err = Action::parse(&json!({"action": "mouse_move"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: coordinate is required for mouse_move"
        );
    }

    #[test]
    fn mouse_move_rejects_text() {
        let args = json!({"action": "mouse_move", "coordinate": [1, 2], "text": "x"});
        let err = Action::parse(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: text is not accepted for mouse_move"
        );
    }

    #[test]
    fn coordinate_shape_is_checked() {
        for bad in [json!([1]), json!([1, 2, 3]), json!("1,2"), json!(7)] {
            let args = json!({"action": "mouse_move", "coordinate": bad});
            assert!(Action::parse(&args).is_err());
        }
    }

    #[test]
    fn coordinate_values_must_be_non_negative_integers() {
        for bad in [json!([-1, 2]), json!([1.5, 2]), json!([1, "2"]), json!([1, 4294967296u64])] {
            let args = json!({"action": "mouse_move", "coordinate": bad});
            let err = Action::parse(&args).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{bad}");
        }
    }

    #[test]
    fn key_requires_text_and_rejects_coordinate() {
        let err = Action::parse(&json!({"action": "key"})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: text is required for key");

        let args = json!({"action": "key", "text": "a", "coordinate": [1, 2]});
        let err = Action::parse(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: coordinate is not accepted for key"
        );
    }

    #[test]
    fn type_text_must_be_a_string() {
        let err = Action::parse(&json!({"action": "type", "text": 42})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: text must be a string");
    }

    #[test]
    fn bare_actions_reject_both_parameters() {
        let args = json!({"action": "screenshot", "coordinate": [1, 2]});
        assert!(Action::parse(&args).is_err());
        let args = json!({"action": "left_click", "text": "boom"});
        assert!(Action::parse(&args).is_err());
    }
}
