//! Canned upstream responses captured from the Walhall Core wire format.
//!
//! The bodies are verbatim captures, including the many fields the adaptor
//! never reads, so tests exercise the same lenient decoding production sees.
//! [`EXAMPLE_TOKEN`] decodes to user
//! `0b618579-f546-4338-9ece-a1c981f90c80` / username `chrishumanitec`, whose
//! personal org appears in [`USER`] alongside `corporate-org`.

/// A real (long-expired) bearer token for `chrishumanitec`.
pub const EXAMPLE_TOKEN: &str = include_str!("../fixtures/token.txt");

/// UUID of the user [`EXAMPLE_TOKEN`] identifies.
pub const EXAMPLE_USER_UUID: &str = "0b618579-f546-4338-9ece-a1c981f90c80";

/// Username carried by [`EXAMPLE_TOKEN`]; also the name of the self-org.
pub const EXAMPLE_USERNAME: &str = "chrishumanitec";

/// UUID of `corporate-org`, the one non-self org in [`USER`].
pub const CORPORATE_ORG_UUID: &str = "f33f013e-e532-4b27-958e-50220a18a2bd";

/// `GET /api/walhalluser/{uuid}`: the user's org memberships, self-org
/// included.
pub const USER: &str = include_str!("../fixtures/user.json");

/// `GET /api/application?...`: two apps in `corporate-org`.
pub const APPS: &str = include_str!("../fixtures/apps.json");

/// `GET /api/logicmodule?...`: two modules, with three and one versions.
pub const MODULES: &str = include_str!("../fixtures/modules.json");

/// `GET /api/environments?...`: one environment (`Development`) with one
/// deployed module version.
pub const ENVIRONMENTS: &str = include_str!("../fixtures/environments.json");

/// `GET /api/configuration?...`: four configurations of the deployed module
/// version.
pub const CONFIGURATIONS: &str = include_str!("../fixtures/configurations.json");
