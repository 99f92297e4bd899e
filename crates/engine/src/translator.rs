//! Renders a homework record into the chat message announcing its new status.

use watch_common::error::WatchError;
use watch_common::types::HomeworkRecord;

use crate::catalog::StatusCatalog;

pub const DEFAULT_STATUS_TEMPLATE: &str = "Изменился статус проверки работы \"{name}\". {verdict}";

/// Turns records into notification text using a [`StatusCatalog`] and a
/// template with `{name}` and `{verdict}` placeholders.
#[derive(Debug, Clone)]
pub struct StatusTranslator {
    catalog: StatusCatalog,
    template: String,
}

impl StatusTranslator {
    pub fn new(catalog: StatusCatalog) -> Self {
        Self {
            catalog,
            template: DEFAULT_STATUS_TEMPLATE.to_string(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn catalog(&self) -> &StatusCatalog {
        &self.catalog
    }

    pub fn translate(&self, record: &HomeworkRecord) -> Result<String, WatchError> {
        let name = non_empty(record.name.as_deref())
            .ok_or_else(|| WatchError::MissingField("homework_name".to_string()))?;
        let status = non_empty(record.status.as_deref())
            .ok_or_else(|| WatchError::MissingField("status".to_string()))?;

        let verdict = self.catalog.translate(status)?;

        Ok(self
            .template
            .replace("{name}", name)
            .replace("{verdict}", verdict))
    }
}

impl Default for StatusTranslator {
    fn default() -> Self {
        Self::new(StatusCatalog::new())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
