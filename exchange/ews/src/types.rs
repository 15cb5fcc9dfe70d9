use std::fmt;

use xml::writer::XmlEvent;

pub const MESSAGES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/messages";
pub const SOAP_NS_URI: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const TYPES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

/// The schema version announced in the header of every request.
pub const REQUEST_SERVER_VERSION: &str = "Exchange2007_SP1";

pub trait EwsWrite<W> {
    /// Writes the struct as XML using the provided writer.
    fn write(&self, writer: &mut xml::EventWriter<W>) -> Result<(), xml::writer::Error>;
}

/// Writes an element containing only text.
fn write_text_element<W: std::io::Write>(
    writer: &mut xml::EventWriter<W>,
    name: &str,
    text: &str,
) -> Result<(), xml::writer::Error> {
    writer.write(XmlEvent::start_element(name))?;
    writer.write(XmlEvent::characters(text))?;
    writer.write(XmlEvent::end_element())
}

/// An identifier for referencing a folder by name, e.g. "inbox" or
/// "sentitems".
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/distinguishedfolderid>.
pub struct DistinguishedFolderId {
    pub id: String,
}

impl DistinguishedFolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl<W: std::io::Write> EwsWrite<W> for DistinguishedFolderId {
    fn write(&self, writer: &mut xml::EventWriter<W>) -> Result<(), xml::writer::Error> {
        writer.write(XmlEvent::start_element("t:DistinguishedFolderId").attr("Id", &self.id))?;
        writer.write(XmlEvent::end_element())
    }
}

/// A request for the default properties of one or more folders, which
/// include their display name and message counts.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/getfolder>.
pub struct GetFolder {
    pub folder_ids: Vec<DistinguishedFolderId>,
}

impl GetFolder {
    /// Creates a request for a single well-known folder.
    pub fn distinguished(id: impl Into<String>) -> Self {
        Self {
            folder_ids: vec![DistinguishedFolderId::new(id)],
        }
    }
}

impl<W: std::io::Write> EwsWrite<W> for GetFolder {
    fn write(&self, writer: &mut xml::EventWriter<W>) -> Result<(), xml::writer::Error> {
        writer.write(XmlEvent::start_element("m:GetFolder"))?;

        // See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/foldershape>.
        writer.write(XmlEvent::start_element("m:FolderShape"))?;
        write_text_element(writer, "t:BaseShape", "Default")?;
        writer.write(XmlEvent::end_element())?;

        writer.write(XmlEvent::start_element("m:FolderIds"))?;
        for id in self.folder_ids.iter() {
            id.write(writer)?;
        }
        writer.write(XmlEvent::end_element())?;

        writer.write(XmlEvent::end_element())
    }
}

/// An HTML email message to be created on the server.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/message-ex15websvcsotherref>.
pub struct Message {
    pub subject: String,
    pub body_html: String,
    pub to_recipients: Vec<String>,
}

impl<W: std::io::Write> EwsWrite<W> for Message {
    fn write(&self, writer: &mut xml::EventWriter<W>) -> Result<(), xml::writer::Error> {
        writer.write(XmlEvent::start_element("t:Message"))?;

        write_text_element(writer, "t:Subject", &self.subject)?;

        writer.write(XmlEvent::start_element("t:Body").attr("BodyType", "HTML"))?;
        writer.write(XmlEvent::characters(&self.body_html))?;
        writer.write(XmlEvent::end_element())?;

        writer.write(XmlEvent::start_element("t:ToRecipients"))?;
        for address in self.to_recipients.iter() {
            writer.write(XmlEvent::start_element("t:Mailbox"))?;
            write_text_element(writer, "t:EmailAddress", address)?;
            writer.write(XmlEvent::end_element())?;
        }
        writer.write(XmlEvent::end_element())?;

        writer.write(XmlEvent::end_element())
    }
}

/// A request which sends messages and keeps a copy of each in a folder.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitem>.
pub struct CreateItem {
    pub saved_item_folder_id: DistinguishedFolderId,
    pub items: Vec<Message>,
}

impl CreateItem {
    /// Creates a request which sends a single message and keeps a copy in the
    /// sender's "Sent Items" folder.
    pub fn send_and_save(message: Message) -> Self {
        Self {
            saved_item_folder_id: DistinguishedFolderId::new("sentitems"),
            items: vec![message],
        }
    }
}

impl<W: std::io::Write> EwsWrite<W> for CreateItem {
    fn write(&self, writer: &mut xml::EventWriter<W>) -> Result<(), xml::writer::Error> {
        writer.write(
            XmlEvent::start_element("m:CreateItem").attr("MessageDisposition", "SendAndSaveCopy"),
        )?;

        writer.write(XmlEvent::start_element("m:SavedItemFolderId"))?;
        self.saved_item_folder_id.write(writer)?;
        writer.write(XmlEvent::end_element())?;

        writer.write(XmlEvent::start_element("m:Items"))?;
        for item in self.items.iter() {
            item.write(writer)?;
        }
        writer.write(XmlEvent::end_element())?;

        writer.write(XmlEvent::end_element())
    }
}

/// The scope of a `ResponseCode`, as given by the element containing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseScope {
    /// The code applies to the response as a whole.
    ResponseLevel,

    /// The code applies to the user on whose behalf the request was made.
    UserResponseLevel,

    /// The code sits in an element we don't know the meaning of, e.g. a
    /// per-item response message.
    Unrecognized,
}

impl ResponseScope {
    /// Derives the scope from the local name of a status code's parent
    /// element.
    pub fn from_parent_name(local_name: &str) -> Self {
        match local_name {
            "Response" => ResponseScope::ResponseLevel,
            "UserResponse" => ResponseScope::UserResponseLevel,
            _ => ResponseScope::Unrecognized,
        }
    }
}

impl fmt::Display for ResponseScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ResponseScope::ResponseLevel => "response-level",
            ResponseScope::UserResponseLevel => "user-level",
            ResponseScope::Unrecognized => "unrecognized-level",
        };

        f.write_str(description)
    }
}

/// A status code found in a response, along with its scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusCode {
    pub scope: ResponseScope,
    pub value: String,
}

impl StatusCode {
    /// The value servers use to signal success.
    pub const NO_ERROR: &'static str = "NoError";

    pub fn is_error(&self) -> bool {
        self.value != Self::NO_ERROR
    }
}

/// The name and message counts of a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderSummary {
    pub display_name: String,
    pub total_count: u32,
    pub unread_count: u32,
}

/// The outcome of a request to send a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendOutcome {
    pub sent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_to_string<X: EwsWrite<Vec<u8>>>(value: &X) -> String {
        let mut writer = xml::EmitterConfig::new()
            .write_document_declaration(false)
            .create_writer(Vec::new());
        value.write(&mut writer).unwrap();

        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn get_folder_lists_every_folder_id() {
        let request = GetFolder {
            folder_ids: vec![
                DistinguishedFolderId::new("inbox"),
                DistinguishedFolderId::new("drafts"),
            ],
        };

        assert_eq!(
            write_to_string(&request),
            concat!(
                "<m:GetFolder><m:FolderShape><t:BaseShape>Default</t:BaseShape></m:FolderShape>",
                r#"<m:FolderIds><t:DistinguishedFolderId Id="inbox" />"#,
                r#"<t:DistinguishedFolderId Id="drafts" /></m:FolderIds></m:GetFolder>"#,
            )
        );
    }

    #[test]
    fn scope_follows_parent_name() {
        assert_eq!(
            ResponseScope::from_parent_name("Response"),
            ResponseScope::ResponseLevel
        );
        assert_eq!(
            ResponseScope::from_parent_name("UserResponse"),
            ResponseScope::UserResponseLevel
        );
        assert_eq!(
            ResponseScope::from_parent_name("GetFolderResponseMessage"),
            ResponseScope::Unrecognized
        );
    }

    #[test]
    fn no_error_is_not_an_error() {
        let code = StatusCode {
            scope: ResponseScope::ResponseLevel,
            value: "NoError".to_string(),
        };
        assert!(!code.is_error());

        let code = StatusCode {
            scope: ResponseScope::ResponseLevel,
            value: "ErrorFolderNotFound".to_string(),
        };
        assert!(code.is_error());
    }
}
