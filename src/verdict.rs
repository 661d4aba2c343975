use serde_json::Value;

use crate::fault::InterpretFault;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub(crate) fn from_code(code: &str) -> Option<Self> {
        match code {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub(crate) fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Turns one homework record into the chat message for its current status.
pub(crate) fn interpret(record: &Value) -> Result<String, InterpretFault> {
    let record = record.as_object().ok_or(InterpretFault::NotAMapping)?;

    let status = match record.get("status") {
        None => return Err(InterpretFault::MissingField("status")),
        Some(Value::String(code)) => HomeworkStatus::from_code(code)
            .ok_or_else(|| InterpretFault::UnknownStatus(code.clone()))?,
        Some(other) => return Err(InterpretFault::UnknownStatus(other.to_string())),
    };

    let name = match record.get("homework_name") {
        None => return Err(InterpretFault::MissingField("homework_name")),
        Some(Value::String(name)) => name,
        Some(_) => return Err(InterpretFault::InvalidField("homework_name")),
    };

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name,
        status.verdict()
    ))
}
