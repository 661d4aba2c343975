use thiserror::Error;

/// Startup configuration problems. Never recovered from.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigFault {
    #[error("Программа не будет работать. Отсутствуют токены: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("Некорректное значение переменной {name}: {value:?}")]
    InvalidSetting { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub(crate) enum NetworkFault {
    #[error("Произошла ошибка при запросе к API: {0}")]
    Transport(#[from] curl::Error),
    #[error("Код ответа API: {0}")]
    Status(u32),
    #[error("Ошибка при разборе JSON ответа API: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SchemaFault {
    #[error("Ответ API должен быть словарем")]
    NotAMapping,
    #[error("Отсутствует ключ \"homeworks\" в ответе API")]
    MissingHomeworks,
    #[error("Значение ключа \"homeworks\" должно быть списком")]
    InvalidHomeworks,
    #[error("Значение ключа \"current_date\" должно быть целым числом")]
    InvalidCurrentDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum InterpretFault {
    #[error("Запись о домашней работе должна быть словарем")]
    NotAMapping,
    #[error("Нет ключа \"{0}\" в записи о домашней работе")]
    MissingField(&'static str),
    #[error("Значение ключа \"{0}\" в записи о домашней работе должно быть строкой")]
    InvalidField(&'static str),
    #[error("Неизвестный статус домашней работы: {0}")]
    UnknownStatus(String),
}

/// Anything that can go wrong in a single poll cycle. All of these are
/// reported and then retried on the next cycle.
#[derive(Debug, Error)]
pub(crate) enum CycleFault {
    #[error(transparent)]
    Network(#[from] NetworkFault),
    #[error(transparent)]
    Schema(#[from] SchemaFault),
    #[error(transparent)]
    Interpret(#[from] InterpretFault),
}
