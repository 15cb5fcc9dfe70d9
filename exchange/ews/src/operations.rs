use crate::{
    credentials::Credentials,
    net::Transport,
    response::{classify, extract_folder_summary, extract_send_outcome},
    trace::Trace,
    types::{CreateItem, FolderSummary, GetFolder, Message, SendOutcome},
    xml::{build_request, Element},
    Error,
};

/// An HTML message to a single recipient.
#[derive(Clone, Debug)]
pub struct OutgoingMessage {
    pub subject: String,
    pub body_html: String,
    pub recipient_address: String,
}

impl From<&OutgoingMessage> for Message {
    fn from(value: &OutgoingMessage) -> Self {
        Message {
            subject: value.subject.clone(),
            body_html: value.body_html.clone(),
            to_recipients: vec![value.recipient_address.clone()],
        }
    }
}

/// Retrieves the name and message counts of a well-known folder, such as
/// "inbox".
pub fn get_folder_summary<T: Transport + ?Sized>(
    transport: &T,
    credentials: &Credentials,
    folder_id: &str,
    trace: &mut dyn Trace,
) -> Result<FolderSummary, Error> {
    let request = build_request(&GetFolder::distinguished(folder_id))?;

    trace.write_line("Get folder operation request:");
    trace.write_line(&request);

    let envelope = transport.send(credentials, &request)?;
    trace_response(&envelope, trace);

    let classified = classify(&envelope)?;
    let summary = extract_folder_summary(&classified)?;

    trace.write_line(&format!("Folder name:     {}", summary.display_name));
    trace.write_line(&format!("Total messages:  {}", summary.total_count));
    trace.write_line(&format!("Unread messages: {}", summary.unread_count));

    Ok(summary)
}

/// Sends a message, keeping a copy in the sender's "Sent Items" folder.
pub fn send_message<T: Transport + ?Sized>(
    transport: &T,
    credentials: &Credentials,
    message: &OutgoingMessage,
    trace: &mut dyn Trace,
) -> Result<SendOutcome, Error> {
    let request = build_request(&CreateItem::send_and_save(message.into()))?;

    trace.write_line("Create item operation request:");
    trace.write_line(&request);

    let envelope = transport.send(credentials, &request)?;
    trace_response(&envelope, trace);

    let classified = classify(&envelope)?;
    let outcome = extract_send_outcome(&classified);

    trace.write_line("Message sent successfully.");

    Ok(outcome)
}

fn trace_response(envelope: &Element, trace: &mut dyn Trace) {
    trace.write_line("Response:");

    match envelope.to_pretty_string() {
        Ok(pretty) => trace.write_line(&pretty),
        Err(err) => log::warn!("unable to format response for display: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{
        credentials::Secret,
        types::{ResponseScope, MESSAGES_NS_URI, TYPES_NS_URI},
        xml::parse_envelope,
    };

    /// Answers every request with a canned response, remembering the
    /// requests it was given.
    struct CannedTransport {
        response: String,
        requests: RefCell<Vec<String>>,
    }

    impl CannedTransport {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        fn send(&self, _credentials: &Credentials, body: &str) -> Result<Element, Error> {
            self.requests.borrow_mut().push(body.to_string());
            Ok(parse_envelope(self.response.as_bytes())?)
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("user@example.com", Secret::new("hunter2")).unwrap()
    }

    fn message() -> OutgoingMessage {
        OutgoingMessage {
            subject: "Company Soccer Team".to_string(),
            body_html: "Are you interested in joining?".to_string(),
            recipient_address: "someone@example.com".to_string(),
        }
    }

    #[test]
    fn folder_summary_runs_whole_pipeline() {
        let transport = CannedTransport::new(include_str!("../tests/fixtures/get_folder_inbox.xml"));
        let mut trace: Vec<String> = Vec::new();

        let summary = get_folder_summary(&transport, &credentials(), "inbox", &mut trace).unwrap();
        assert_eq!(
            summary,
            FolderSummary {
                display_name: "Inbox".to_string(),
                total_count: 42,
                unread_count: 3,
            }
        );

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        let request = parse_envelope(requests[0].as_bytes()).unwrap();
        let folder_id = request
            .descendants_named(TYPES_NS_URI, "DistinguishedFolderId")
            .next()
            .unwrap();
        assert_eq!(folder_id.attribute("Id"), Some("inbox"));

        assert_eq!(trace[0], "Get folder operation request:");
        assert_eq!(trace[1], requests[0]);
        assert_eq!(trace[2], "Response:");
        assert!(trace.contains(&"Folder name:     Inbox".to_string()));
        assert!(trace.contains(&"Total messages:  42".to_string()));
        assert!(trace.contains(&"Unread messages: 3".to_string()));
    }

    #[test]
    fn folder_summary_stops_at_protocol_error() {
        let transport = CannedTransport::new(include_str!(
            "../tests/fixtures/response_folder_not_found.xml"
        ));
        let mut trace: Vec<String> = Vec::new();

        let result = get_folder_summary(&transport, &credentials(), "inbox", &mut trace);
        assert!(matches!(
            result,
            Err(Error::Protocol {
                scope: ResponseScope::ResponseLevel,
                ..
            })
        ));

        // The fixture carries folder data, which must not have been read.
        assert!(!trace.iter().any(|line| line.starts_with("Folder name:")));
    }

    #[test]
    fn send_message_reports_success() {
        let transport =
            CannedTransport::new(include_str!("../tests/fixtures/create_item_success.xml"));
        let mut trace: Vec<String> = Vec::new();

        let outcome = send_message(&transport, &credentials(), &message(), &mut trace).unwrap();
        assert_eq!(outcome, SendOutcome { sent: true });
        assert_eq!(trace.last().unwrap(), "Message sent successfully.");

        let requests = transport.requests.borrow();
        let request = parse_envelope(requests[0].as_bytes()).unwrap();
        let create_item = request
            .descendants_named(MESSAGES_NS_URI, "CreateItem")
            .next()
            .unwrap();
        assert_eq!(
            create_item.attribute("MessageDisposition"),
            Some("SendAndSaveCopy")
        );

        let recipient = request
            .descendants_named(TYPES_NS_URI, "EmailAddress")
            .next()
            .unwrap();
        assert_eq!(recipient.text(), "someone@example.com");
    }

    #[test]
    fn send_message_fails_on_user_error() {
        let transport =
            CannedTransport::new(include_str!("../tests/fixtures/response_user_error.xml"));
        let mut trace: Vec<String> = Vec::new();

        let result = send_message(&transport, &credentials(), &message(), &mut trace);
        assert!(matches!(
            result,
            Err(Error::Protocol {
                scope: ResponseScope::UserResponseLevel,
                ..
            })
        ));
        assert!(!trace.contains(&"Message sent successfully.".to_string()));
    }

    #[test]
    fn deeply_nested_response_is_transport_error() {
        let depth = 20_000;
        let transport = CannedTransport::new(format!(
            "{}{}",
            "<Envelope>".repeat(depth),
            "</Envelope>".repeat(depth)
        ));
        let mut trace: Vec<String> = Vec::new();

        let result = get_folder_summary(&transport, &credentials(), "inbox", &mut trace);
        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(!trace.contains(&"Response:".to_string()));
    }

    #[test]
    fn transcript_never_contains_secret() {
        let transport = CannedTransport::new(include_str!("../tests/fixtures/get_folder_inbox.xml"));
        let mut trace: Vec<String> = Vec::new();

        get_folder_summary(&transport, &credentials(), "inbox", &mut trace).unwrap();
        assert!(!trace.iter().any(|line| line.contains("hunter2")));
    }
}
