/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

/// The `credentials` module holds the user's identity and secret, and the
/// trait through which they are acquired.
pub mod credentials;

/// The `error` module defines the errors which may occur while talking to
/// Exchange Web Services.
pub mod error;

/// The `net` module is responsible for making requests to the Exchange Web
/// Services API.
pub mod net;

/// The `operations` module ties request building, transport, and response
/// processing together for each supported use case.
pub mod operations;

/// The `response` module inspects parsed responses for error codes and
/// extracts operation results from them.
pub mod response;

/// The `trace` module provides the session transcript sink.
pub mod trace;

/// The `types` module defines the various data structures used for EWS requests
/// and responses. It also provides serialization routines for the requests.
pub mod types;

/// The `xml` module provides utilities for processing of XML.
pub mod xml;

pub use error::Error;
