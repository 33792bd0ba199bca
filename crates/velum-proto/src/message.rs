//! Decoded DNS messages.

use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// A decoded DNS message.
///
/// Only the parts the resolver pipeline works with are modeled: the id,
/// the flags that must survive a reply round-trip, the response code, the
/// question section, and the answer section. Authority and additional
/// sections are a listener-layer concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id.
    pub id: u16,

    /// True for responses, false for queries.
    pub response: bool,

    /// Recursion desired flag, mirrored from query to reply.
    pub recursion_desired: bool,

    /// Response code.
    pub rcode: ResponseCode,

    /// The question section.
    pub questions: Vec<Question>,

    /// The answer section.
    pub answers: Vec<Record>,
}

impl Message {
    /// Creates a query message for a single question.
    ///
    /// The id is left at zero; the transport that eventually sends the
    /// query on the wire assigns the real one.
    pub fn query(question: Question) -> Self {
        Self {
            id: 0,
            response: false,
            recursion_desired: true,
            rcode: ResponseCode::NoError,
            questions: vec![question],
            answers: Vec::new(),
        }
    }

    /// Creates an empty reply mirroring the query's id and flags.
    pub fn reply_to(query: &Message) -> Self {
        Self {
            id: query.id,
            response: true,
            recursion_desired: query.recursion_desired,
            rcode: ResponseCode::NoError,
            questions: query.questions.clone(),
            answers: Vec::new(),
        }
    }

    /// Returns the message with the given id.
    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// Returns the first question, if any.
    #[inline]
    pub fn first_question(&self) -> Option<&Question> {
        self.questions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;
    use std::str::FromStr;

    #[test]
    fn test_serde_roundtrip() {
        use crate::record::Record;
        use std::net::Ipv4Addr;

        let name = Name::from_str("example.com").unwrap();
        let query = Message::query(Question::a(name.clone()));
        let mut reply = Message::reply_to(&query);
        reply
            .answers
            .push(Record::a(name, 300, Ipv4Addr::new(93, 184, 216, 34)));

        let json = serde_json::to_string(&reply).unwrap();
        let parsed: Message = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, reply);
    }

    #[test]
    fn test_reply_mirrors_query() {
        let question = Question::a(Name::from_str("example.com").unwrap());
        let query = Message::query(question.clone()).with_id(0x4d2);

        let reply = Message::reply_to(&query);

        assert_eq!(reply.id, 0x4d2);
        assert!(reply.response);
        assert_eq!(reply.recursion_desired, query.recursion_desired);
        assert_eq!(reply.questions, vec![question]);
        assert!(reply.answers.is_empty());
    }
}
