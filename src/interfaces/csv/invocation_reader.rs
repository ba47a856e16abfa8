use crate::domain::identity::{Caller, Role};
use crate::error::{LendingError, Result};
use std::io::Read;

/// One scripted call: who invokes which operation with which arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub caller: Caller,
    pub operation: String,
    pub args: Vec<String>,
}

impl TryFrom<csv::StringRecord> for Invocation {
    type Error = LendingError;

    fn try_from(record: csv::StringRecord) -> Result<Self> {
        let mut fields = record.iter();
        let (Some(role), Some(identity), Some(operation)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(LendingError::ValidationError(format!(
                "expected at least role, identity and operation, got {} fields",
                record.len()
            )));
        };

        let role: Role = role.parse()?;
        Ok(Self {
            caller: Caller::with_role(identity, role),
            operation: operation.to_string(),
            args: fields.map(str::to_string).collect(),
        })
    }
}

/// Reads invocations from a CSV script.
///
/// The header is `role,identity,operation,args...`; records may carry any number of
/// trailing argument columns.
pub struct InvocationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InvocationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one result per record.
    pub fn invocations(self) -> impl Iterator<Item = Result<Invocation>> {
        self.reader
            .into_records()
            .map(|record| record.map_err(LendingError::from).and_then(Invocation::try_from))
    }
}
