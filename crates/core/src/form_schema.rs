//! Declarative form schemas and their widget rendering.
//!
//! A form's `fields` column holds an ordered JSON array of field descriptors:
//!
//! ```json
//! [
//!   {"name": "full_name", "type": "text", "label": "Full name", "required": true},
//!   {"name": "skin_type", "type": "select", "label": "Skin type",
//!    "options": ["dry", "oily", {"value": "mixed", "label": "Combination"}]},
//!   {"type": "separator", "label": "Consent"},
//!   {"name": "signature", "type": "signature", "label": "Sign here", "required": true}
//! ]
//! ```
//!
//! The type tag is an open set. Known tags (and the capitalized aliases older
//! forms were saved with) map to a [`FieldType`]; anything else renders as a
//! plain text input. Submissions are only checked for presence of required
//! answers, never against the field types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of fields a single form may declare.
pub const MAX_FIELDS: usize = 200;

/// Maximum length of a field name.
pub const MAX_FIELD_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Textarea,
    Select,
    Checkbox,
    CheckboxGroup,
    Radio,
    Date,
    Signature,
    Separator,
}

impl FieldType {
    /// Resolve a stored type tag, including legacy aliases.
    ///
    /// Returns `None` for tags this service does not know about.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "text" | "Text" => Self::Text,
            "email" | "Email" => Self::Email,
            "tel" | "Tel" | "Phone" => Self::Tel,
            "textarea" | "Textarea" | "TextArea" => Self::Textarea,
            "select" | "Select" => Self::Select,
            "checkbox" | "Checkbox" => Self::Checkbox,
            "checkbox_group" | "CheckboxGroup" => Self::CheckboxGroup,
            "radio" | "Radio" => Self::Radio,
            "date" | "Date" => Self::Date,
            "signature" | "Signature" => Self::Signature,
            "separator" | "Separator" => Self::Separator,
            _ => return None,
        };
        Some(kind)
    }

    /// Resolve a tag, falling back to [`FieldType::Text`] for unknown tags.
    pub fn from_tag_or_text(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(Self::Text)
    }

    /// Whether the field collects an answer at all.
    pub fn carries_value(&self) -> bool {
        !matches!(self, Self::Separator)
    }

    /// Whether the field offers a fixed list of choices.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::CheckboxGroup)
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// A single choice for select, radio and checkbox-group fields.
///
/// Stored either as a bare string or as `{"value": .., "label": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOption {
    Plain(String),
    Labeled { value: String, label: String },
}

impl FieldOption {
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Labeled { label, .. } => label,
        }
    }
}

fn default_type_tag() -> String {
    "text".to_string()
}

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_type_tag))
}

/// One entry of a form's `fields` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Raw type tag as stored; see [`FieldType::from_tag`].
    #[serde(rename = "type", default = "default_type_tag", deserialize_with = "null_as_text")]
    pub field_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<FieldOption>,
}

impl FieldDescriptor {
    pub fn kind(&self) -> FieldType {
        FieldType::from_tag_or_text(&self.field_type)
    }

    /// Label to show, falling back to the field name.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

/// A choice rendered for a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetOption {
    pub value: String,
    pub label: String,
}

/// The input control a field renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    /// Single-line `<input>`; `input_type` is the HTML input type.
    Input { input_type: &'static str },
    Textarea,
    Select { options: Vec<WidgetOption> },
    Checkbox,
    CheckboxGroup { options: Vec<WidgetOption> },
    Radio { options: Vec<WidgetOption> },
    Signature,
    Separator,
}

/// Render-ready description of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Widget {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub control: Control,
}

fn widget_options(options: &[FieldOption]) -> Vec<WidgetOption> {
    options
        .iter()
        .map(|o| WidgetOption {
            value: o.value().to_string(),
            label: o.label().to_string(),
        })
        .collect()
}

/// Map a descriptor to its widget.
pub fn render_widget(field: &FieldDescriptor) -> Widget {
    let kind = field.kind();
    let control = match kind {
        FieldType::Text => Control::Input { input_type: "text" },
        FieldType::Email => Control::Input { input_type: "email" },
        FieldType::Tel => Control::Input { input_type: "tel" },
        FieldType::Date => Control::Input { input_type: "date" },
        FieldType::Textarea => Control::Textarea,
        FieldType::Select => Control::Select {
            options: widget_options(&field.options),
        },
        FieldType::Checkbox => Control::Checkbox,
        FieldType::CheckboxGroup => Control::CheckboxGroup {
            options: widget_options(&field.options),
        },
        FieldType::Radio => Control::Radio {
            options: widget_options(&field.options),
        },
        FieldType::Signature => Control::Signature,
        FieldType::Separator => Control::Separator,
    };

    Widget {
        name: field.name.clone(),
        label: field.display_label().to_string(),
        // Separators never take input, whatever the stored flag says.
        required: field.required && kind.carries_value(),
        control,
    }
}

/// Render every field of a schema, preserving order.
pub fn render_widgets(fields: &[FieldDescriptor]) -> Vec<Widget> {
    fields.iter().map(render_widget).collect()
}

// ---------------------------------------------------------------------------
// Schema parsing and validation
// ---------------------------------------------------------------------------

/// Parse stored `fields` JSON without validating it.
///
/// Used on read paths where legacy rows must still render.
pub fn parse_fields(json: &Value) -> Result<Vec<FieldDescriptor>, String> {
    serde_json::from_value(json.clone()).map_err(|e| format!("Invalid form fields: {e}"))
}

/// Validate `fields` JSON supplied on form create/update.
///
/// Value-carrying fields need a unique, non-empty name; choice fields need at
/// least one option.
pub fn validate_fields(json: &Value) -> Result<Vec<FieldDescriptor>, String> {
    if !json.is_array() {
        return Err("fields must be a JSON array".to_string());
    }
    let fields = parse_fields(json)?;

    if fields.len() > MAX_FIELDS {
        return Err(format!(
            "Too many fields: {} (max {MAX_FIELDS})",
            fields.len()
        ));
    }

    let mut names = HashSet::new();
    for (i, field) in fields.iter().enumerate() {
        let kind = field.kind();
        if !kind.carries_value() {
            continue;
        }

        let name = field.name.trim();
        if name.is_empty() {
            return Err(format!("fields[{i}] must have a name"));
        }
        if name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(format!(
                "fields[{i}] name exceeds maximum length of {MAX_FIELD_NAME_LENGTH}"
            ));
        }
        if !names.insert(name.to_string()) {
            return Err(format!("Duplicate field name '{name}'"));
        }
        if kind.has_options() && field.options.is_empty() {
            return Err(format!("Field '{name}' must declare at least one option"));
        }
    }

    Ok(fields)
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// Whether a submitted value counts as an answer for a field of `kind`.
pub fn is_answered(kind: FieldType, value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        // An unticked required checkbox (e.g. consent) is not an answer.
        Value::Bool(b) => kind != FieldType::Checkbox || *b,
        Value::Number(_) => true,
    }
}

/// Check a submitted answer map against the schema's required fields.
///
/// Returns the answer map unchanged on success. Unknown keys are kept.
pub fn validate_answers(
    fields: &[FieldDescriptor],
    answers: &Value,
) -> Result<Map<String, Value>, String> {
    let map = answers
        .as_object()
        .ok_or_else(|| "answers must be a JSON object".to_string())?;

    let missing: Vec<&str> = fields
        .iter()
        .filter(|f| f.required && f.kind().carries_value())
        .filter(|f| {
            map.get(&f.name)
                .map_or(true, |value| !is_answered(f.kind(), value))
        })
        .map(|f| f.display_label())
        .collect();

    if !missing.is_empty() {
        return Err(format!("Missing required fields: {}", missing.join(", ")));
    }

    Ok(map.clone())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field(name: &str, tag: &str, required: bool) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            field_type: tag.to_string(),
            label: String::new(),
            required,
            options: Vec::new(),
        }
    }

    // -- FieldType ------------------------------------------------------------

    #[test]
    fn legacy_aliases_resolve() {
        assert_eq!(FieldType::from_tag("Text"), Some(FieldType::Text));
        assert_eq!(FieldType::from_tag("Phone"), Some(FieldType::Tel));
        assert_eq!(FieldType::from_tag("TextArea"), Some(FieldType::Textarea));
        assert_eq!(
            FieldType::from_tag("CheckboxGroup"),
            Some(FieldType::CheckboxGroup)
        );
    }

    #[test]
    fn unknown_tag_falls_back_to_text() {
        assert_eq!(FieldType::from_tag("color"), None);
        assert_eq!(FieldType::from_tag_or_text("color"), FieldType::Text);
    }

    // -- Rendering ------------------------------------------------------------

    #[test]
    fn unknown_tag_renders_text_input() {
        let widget = render_widget(&field("fav", "slider", false));
        assert_eq!(widget.control, Control::Input { input_type: "text" });
    }

    #[test]
    fn label_falls_back_to_name() {
        let widget = render_widget(&field("phone", "tel", true));
        assert_eq!(widget.label, "phone");
        assert_eq!(widget.control, Control::Input { input_type: "tel" });
        assert!(widget.required);
    }

    #[test]
    fn separator_is_never_required() {
        let widget = render_widget(&field("", "separator", true));
        assert_eq!(widget.control, Control::Separator);
        assert!(!widget.required);
    }

    #[test]
    fn options_accept_plain_and_labeled_forms() {
        let fields = parse_fields(&json!([
            {"name": "skin", "type": "radio", "options": ["dry", {"value": "mix", "label": "Combination"}]}
        ]))
        .unwrap();
        let widget = render_widget(&fields[0]);
        let Control::Radio { options } = widget.control else {
            panic!("expected radio control");
        };
        assert_eq!(options[0].value, "dry");
        assert_eq!(options[0].label, "dry");
        assert_eq!(options[1].value, "mix");
        assert_eq!(options[1].label, "Combination");
    }

    #[test]
    fn widget_serializes_with_control_tag() {
        let json = serde_json::to_value(render_widget(&field("email", "Email", false))).unwrap();
        assert_eq!(json["control"], "input");
        assert_eq!(json["input_type"], "email");
        assert_eq!(json["name"], "email");
    }

    #[test]
    fn render_preserves_order() {
        let widgets = render_widgets(&[field("a", "text", false), field("b", "date", false)]);
        let names: Vec<_> = widgets.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    // -- Validation -----------------------------------------------------------

    #[test]
    fn fields_must_be_array() {
        assert!(validate_fields(&json!({"name": "x"})).is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = validate_fields(&json!([
            {"name": "a", "type": "text"},
            {"name": "a", "type": "email"}
        ]))
        .unwrap_err();
        assert!(err.contains("Duplicate field name 'a'"));
    }

    #[test]
    fn unnamed_value_field_rejected_but_separator_allowed() {
        assert!(validate_fields(&json!([{"type": "text", "label": "Name"}])).is_err());
        assert!(validate_fields(&json!([{"type": "separator", "label": "Part 2"}])).is_ok());
    }

    #[test]
    fn choice_field_needs_options() {
        let err = validate_fields(&json!([{"name": "c", "type": "select"}])).unwrap_err();
        assert!(err.contains("at least one option"));
    }

    #[test]
    fn missing_type_defaults_to_text() {
        let fields = validate_fields(&json!([{"name": "note"}])).unwrap();
        assert_eq!(fields[0].kind(), FieldType::Text);
    }

    // -- Answers --------------------------------------------------------------

    #[test]
    fn required_answers_present() {
        let fields = vec![field("name", "text", true), field("notes", "textarea", false)];
        let answers = json!({"name": "Ana"});
        assert!(validate_answers(&fields, &answers).is_ok());
    }

    #[test]
    fn blank_and_missing_required_answers_reported() {
        let mut name = field("name", "text", true);
        name.label = "Full name".to_string();
        let fields = vec![name, field("dob", "date", true)];
        let err = validate_answers(&fields, &json!({"name": "   "})).unwrap_err();
        assert_eq!(err, "Missing required fields: Full name, dob");
    }

    #[test]
    fn unticked_required_checkbox_is_missing() {
        let fields = vec![field("consent", "checkbox", true)];
        assert!(validate_answers(&fields, &json!({"consent": false})).is_err());
        assert!(validate_answers(&fields, &json!({"consent": true})).is_ok());
    }

    #[test]
    fn empty_checkbox_group_is_missing() {
        let fields = vec![field("areas", "checkbox_group", true)];
        assert!(validate_answers(&fields, &json!({"areas": []})).is_err());
        assert!(validate_answers(&fields, &json!({"areas": ["face"]})).is_ok());
    }

    #[test]
    fn answers_must_be_object() {
        assert!(validate_answers(&[], &json!(["a"])).is_err());
    }

    #[test]
    fn extra_answer_keys_are_kept() {
        let map = validate_answers(&[], &json!({"extra": 1})).unwrap();
        assert_eq!(map.get("extra"), Some(&json!(1)));
    }

    #[test]
    fn explicit_nulls_parse_like_missing_keys() {
        let fields = parse_fields(&json!([
            {"name": "allergies", "type": null, "label": null, "required": null, "options": null}
        ]))
        .unwrap();
        assert_eq!(fields[0].field_type, "text");
        assert_eq!(fields[0].label, "");
        assert!(!fields[0].required);
        assert!(fields[0].options.is_empty());
        assert_eq!(render_widget(&fields[0]).label, "allergies");
    }
}
