use serde::{Deserialize, Serialize};

/// The shape of the value a rule of a given type expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// Free text.
    #[serde(rename = "string")]
    Text,
    /// Whole number.
    #[serde(rename = "number")]
    Integer,
    #[serde(rename = "date")]
    Date,
    /// Monetary amount, displayed with a currency symbol.
    #[serde(rename = "currency")]
    Currency,
    /// Decimal number.
    #[serde(rename = "double")]
    Decimal,
    /// One value out of a fixed option list.
    #[serde(rename = "select")]
    Select,
}

impl InputKind {
    /// The HTML input type a form should render for this kind.
    #[must_use]
    pub fn html_input_type(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Integer | InputKind::Currency | InputKind::Decimal => "number",
            InputKind::Date => "date",
            InputKind::Select => "select",
        }
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            InputKind::Integer | InputKind::Currency | InputKind::Decimal
        )
    }
}

/// One entry of a [`InputKind::Select`] field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Declarative checks applied by the validator to rule values.
///
/// `custom` names a check registered on the
/// [`Validator`](crate::Validator); the catalog itself carries no code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

/// Input metadata attached to a [`RuleType`](super::RuleType).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    #[serde(rename = "type")]
    pub kind: InputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl InputField {
    #[must_use]
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            placeholder: None,
            min: None,
            max: None,
            step: None,
            currency: None,
            date_format: None,
            options: Vec::new(),
            validation: None,
        }
    }

    #[must_use]
    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_owned());
        self
    }

    #[must_use]
    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn currency(mut self, symbol: &str) -> Self {
        self.currency = Some(symbol.to_owned());
        self
    }

    #[must_use]
    pub fn option(mut self, label: &str, value: &str) -> Self {
        self.options.push(SelectOption {
            label: label.to_owned(),
            value: value.to_owned(),
        });
        self
    }

    #[must_use]
    pub fn validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Step for numeric inputs: the declared one, else a per-kind default.
    #[must_use]
    pub fn step_value(&self) -> f64 {
        if let Some(step) = self.step {
            return step;
        }
        match self.kind {
            InputKind::Currency | InputKind::Decimal => 0.01,
            _ => 1.0,
        }
    }

    /// Currency symbol for currency fields (`$` unless declared).
    #[must_use]
    pub fn currency_symbol(&self) -> Option<&str> {
        match self.kind {
            InputKind::Currency => Some(self.currency.as_deref().unwrap_or("$")),
            _ => None,
        }
    }

    /// Display form of a value: currency and decimal amounts get two decimals.
    #[must_use]
    pub fn format_value(&self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        match self.kind {
            InputKind::Currency | InputKind::Decimal => match value.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => format!("{n:.2}"),
                _ => value.to_owned(),
            },
            _ => value.to_owned(),
        }
    }

    /// Whether `value` is one of the declared select options.
    #[must_use]
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}
