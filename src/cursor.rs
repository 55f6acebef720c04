//! Sequential reader over the groups of one report instance.

use crate::constants::NIL_TOKEN;
use crate::decoder::Termination;
use tracing::trace;

/// Whitespace separated groups of one report, read front to back
#[derive(Debug, Clone)]
pub struct FieldCursor<'a> {
    tokens: Vec<&'a str>,
    position: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            tokens: text.split_whitespace().collect(),
            position: 0,
        }
    }

    /// Move past `count` groups without looking at them
    pub fn skip(&mut self, count: usize) {
        self.position = (self.position + count).min(self.tokens.len());
    }

    pub fn position(&self) -> usize {
        self.position
    }


    /// All groups of the report, including consumed ones
    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    /// Look at the next group without consuming it
    pub fn peek(&self) -> Result<Option<&'a str>, Termination> {
        match self.tokens.get(self.position) {
            Some(token) if is_nil(token) => Err(Termination::Empty),
            Some(token) => Ok(Some(*token)),
            None => Ok(None),
        }
    }

    /// Read a group the grammar requires
    pub fn read_mandatory(&mut self, context: &str) -> Result<&'a str, Termination> {
        match self.read_optional(context)? {
            Some(token) => Ok(token),
            None => Err(Termination::Malformed(format!(
                "missing mandatory group: {}",
                context
            ))),
        }
    }

    /// Read a group that may be absent; `None` means the report ended
    pub fn read_optional(&mut self, context: &str) -> Result<Option<&'a str>, Termination> {
        let token = self.peek()?;
        if let Some(token) = token {
            trace!("{}: '{}'", context, token);
            self.position += 1;
        }
        Ok(token)
    }

    /// Consume groups until one satisfies `predicate`, returning it.
    ///
    /// Exhausting the report returns `None`; a `NIL` on the way ends the
    /// report.
    pub fn advance_to<F>(&mut self, predicate: F) -> Result<Option<&'a str>, Termination>
    where
        F: Fn(&str) -> bool,
    {
        while let Some(token) = self.read_optional("scan")? {
            if predicate(token) {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }
}

fn is_nil(token: &str) -> bool {
    token.eq_ignore_ascii_case(NIL_TOKEN)
}
