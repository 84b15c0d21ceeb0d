//! Bounded representation of a command as handed to the adapter.

use crate::command::CommandKind;
use crate::error::CecError;

use super::MessageData;

/// Longest accepted command name, in bytes.
pub const MAX_NAME_LEN: usize = 32;
/// Largest accepted number of parameters.
pub const MAX_PARAMS: usize = 16;
/// Longest accepted parameter name, in bytes.
pub const MAX_PARAM_NAME_LEN: usize = 32;
/// Longest accepted parameter value, in bytes.
pub const MAX_PARAM_VALUE_LEN: usize = 64;

/// A named parameter of a [`NativeCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeParam {
    name: String,
    value: String,
}

impl NativeParam {
    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value, possibly empty.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A command in the shape the adapter accepts.
///
/// Construction enforces the adapter's field limits, so every value of this
/// type fits the adapter's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCommand {
    name: String,
    params: Vec<NativeParam>,
}

impl NativeCommand {
    /// Creates a command with no parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CecError::LimitExceeded`] when `name` is longer than
    /// [`MAX_NAME_LEN`] bytes or is not a single token.
    pub fn new(name: impl Into<String>) -> Result<Self, CecError> {
        let command_name = name.into();
        check_len("name", &command_name, MAX_NAME_LEN)?;
        check_token("name", &command_name)?;
        Ok(Self {
            name: command_name,
            params: Vec::new(),
        })
    }

    /// Appends a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CecError::LimitExceeded`] when the parameter count, the
    /// parameter name or the value exceeds its limit, when the name is not a
    /// single token, or when the value holds a control character.
    pub fn push_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CecError> {
        if self.params.len() >= MAX_PARAMS {
            return Err(CecError::LimitExceeded {
                field: String::from("params"),
                message: format!("at most {MAX_PARAMS} parameters are accepted"),
            });
        }
        let param = NativeParam {
            name: name.into(),
            value: value.into(),
        };
        check_len("param name", &param.name, MAX_PARAM_NAME_LEN)?;
        check_token("param name", &param.name)?;
        check_len(&param.name, &param.value, MAX_PARAM_VALUE_LEN)?;
        check_printable(&param.name, &param.value)?;
        self.params.push(param);
        Ok(())
    }

    /// Translates queued message data into a native command.
    ///
    /// The command name is fixed for every kind except `SendCommand`, which
    /// takes it from the message's `name` parameter. Parameters are copied in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`CecError::LimitExceeded`] when any field exceeds its limit.
    pub fn from_message(message: &MessageData) -> Result<Self, CecError> {
        let name = match message.kind {
            CommandKind::SendCommand => message.param("name").unwrap_or_default(),
            kind => kind.as_str(),
        };
        let mut command = Self::new(name)?;
        for (param, value) in &message.params {
            command.push_param(param.as_str(), value.as_str())?;
        }
        Ok(command)
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in order.
    #[must_use]
    pub fn params(&self) -> &[NativeParam] {
        &self.params
    }

    /// Value of the first parameter called `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(NativeParam::value)
    }

    /// Renders the command as a single request line:
    /// `<name> <param>=<value> ...`.
    ///
    /// Spaces, `=` and `%` inside values are written as `%20`, `%3D` and
    /// `%25`, so every value ends at the next space.
    #[must_use]
    pub fn to_request_line(&self) -> String {
        let mut line = self.name.clone();
        for param in &self.params {
            line.push(' ');
            line.push_str(&param.name);
            line.push('=');
            push_escaped(&mut line, &param.value);
        }
        line
    }
}

fn push_escaped(line: &mut String, value: &str) {
    for character in value.chars() {
        match character {
            ' ' => line.push_str("%20"),
            '=' => line.push_str("%3D"),
            '%' => line.push_str("%25"),
            other => line.push(other),
        }
    }
}

fn check_token(field: &str, value: &str) -> Result<(), CecError> {
    if value
        .chars()
        .any(|character| character.is_whitespace() || character.is_control() || character == '=')
    {
        return Err(CecError::LimitExceeded {
            field: field.to_owned(),
            message: String::from("must not contain whitespace, control characters or '='"),
        });
    }
    Ok(())
}

fn check_printable(field: &str, value: &str) -> Result<(), CecError> {
    if value.chars().any(char::is_control) {
        return Err(CecError::LimitExceeded {
            field: field.to_owned(),
            message: String::from("must not contain control characters"),
        });
    }
    Ok(())
}

fn check_len(field: &str, value: &str, limit: usize) -> Result<(), CecError> {
    if value.len() > limit {
        return Err(CecError::LimitExceeded {
            field: field.to_owned(),
            message: format!("{} bytes exceeds the {limit} byte limit", value.len()),
        });
    }
    Ok(())
}
