use crate::{
    types::{
        FolderSummary, ResponseScope, SendOutcome, StatusCode, MESSAGES_NS_URI, TYPES_NS_URI,
    },
    xml::Element,
    Error,
};

/// A response envelope which has been checked and found free of error codes.
///
/// Results can only be extracted from a classified envelope.
#[derive(Debug)]
pub struct Classified<'a> {
    envelope: &'a Element,
    status_codes: Vec<StatusCode>,
}

impl<'a> Classified<'a> {
    /// Every status code in the envelope, all of them "NoError".
    pub fn status_codes(&self) -> &[StatusCode] {
        &self.status_codes
    }
}

/// Collects every `ResponseCode` in the envelope, in document order, tagged
/// with the scope given by its parent element.
pub fn status_codes(envelope: &Element) -> Vec<StatusCode> {
    let mut codes = Vec::new();
    let mut stack = vec![(envelope, envelope.child_elements())];

    while let Some((parent, children)) = stack.last_mut() {
        let parent = *parent;
        let Some(child) = children.next() else {
            stack.pop();
            continue;
        };

        if child.is(MESSAGES_NS_URI, "ResponseCode") {
            codes.push(StatusCode {
                scope: ResponseScope::from_parent_name(parent.local_name()),
                value: child.text().trim().to_string(),
            });
        }

        stack.push((child, child.child_elements()));
    }

    codes
}

/// Checks the envelope for error codes.
///
/// The first code in document order which isn't "NoError" decides the
/// outcome, whatever its scope; nothing after it is looked at.
pub fn classify(envelope: &Element) -> Result<Classified<'_>, Error> {
    let status_codes = status_codes(envelope);

    if let Some(code) = status_codes.iter().find(|code| code.is_error()) {
        if code.scope == ResponseScope::Unrecognized {
            log::warn!(
                "response code {} found outside of a Response or UserResponse element",
                code.value
            );
        }

        return Err(Error::Protocol {
            scope: code.scope,
            code: code.value.clone(),
        });
    }

    Ok(Classified {
        envelope,
        status_codes,
    })
}

/// Extracts the summary of the first folder in a `GetFolder` response.
pub fn extract_folder_summary(classified: &Classified<'_>) -> Result<FolderSummary, Error> {
    let folders = classified
        .envelope
        .descendants_named(MESSAGES_NS_URI, "Folders")
        .next()
        .ok_or_else(|| Error::Extraction("response contains no Folders element".to_string()))?;

    folder_summary(folders)
}

/// Extracts a summary for every `Folders` container in a `GetFolder`
/// response.
pub fn extract_folder_summaries(classified: &Classified<'_>) -> Result<Vec<FolderSummary>, Error> {
    let summaries = classified
        .envelope
        .descendants_named(MESSAGES_NS_URI, "Folders")
        .map(folder_summary)
        .collect::<Result<Vec<_>, _>>()?;

    if summaries.is_empty() {
        return Err(Error::Extraction(
            "response contains no Folders element".to_string(),
        ));
    }

    Ok(summaries)
}

/// A `CreateItem` response without errors means the message went out.
pub fn extract_send_outcome(_classified: &Classified<'_>) -> SendOutcome {
    SendOutcome { sent: true }
}

fn folder_summary(folders: &Element) -> Result<FolderSummary, Error> {
    Ok(FolderSummary {
        display_name: first_text(folders, "DisplayName")?,
        total_count: first_count(folders, "TotalCount")?,
        unread_count: first_count(folders, "UnreadCount")?,
    })
}

fn first_text(container: &Element, local_name: &str) -> Result<String, Error> {
    container
        .descendants_named(TYPES_NS_URI, local_name)
        .next()
        .map(Element::text)
        .ok_or_else(|| Error::Extraction(format!("missing {local_name} element")))
}

fn first_count(container: &Element, local_name: &str) -> Result<u32, Error> {
    let text = first_text(container, local_name)?;

    text.trim().parse().map_err(|err| {
        Error::Extraction(format!("{local_name} value {text:?} is not a count: {err}"))
    })
}
