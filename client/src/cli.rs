use {
    clap::{Parser, Subcommand},
    std::path::PathBuf,
    url::Url,
    webdrop_protocol::{ObjectId, SessionId},
};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// Config file. Defaults to `webdrop.json5` in the user config directory.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Session key: the `#fragment` of a share link, or the whole link.
    /// Prompted for when an encrypted session needs it and it is not given.
    #[clap(long, global = true)]
    pub key: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Create a session and print its share link.
    NewSession {
        /// Create a session without end-to-end encryption.
        #[arg(long)]
        plain: bool,
    },
    /// List the objects of a session.
    Ls { session: SessionId },
    SendText { session: SessionId, text: String },
    SendLink {
        session: SessionId,
        url: Url,
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete one object.
    Rm {
        session: SessionId,
        object: ObjectId,
    },
    /// Delete a session with all its objects.
    RmSession { session: SessionId },
    /// Derive the auth token for a key and a stored salt, without contacting the server.
    Derive {
        /// Base64 salt from the session's KDF parameters.
        #[arg(long)]
        salt: String,
        #[arg(long)]
        iterations: Option<u32>,
    },
}
