//! The calls the client makes, with their success codes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateServer,
    ShowServer,
    ListServers,
    ListServersDetail,
    UpdateServer,
    DeleteServer,
    ResetState,
    RebuildServer,
    InjectNetworkInfo,
    ShowFlavor,
}

impl Operation {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateServer => "create_server",
            Self::ShowServer => "show_server",
            Self::ListServers => "list_servers",
            Self::ListServersDetail => "list_servers_detail",
            Self::UpdateServer => "update_server",
            Self::DeleteServer => "delete_server",
            Self::ResetState => "reset_state",
            Self::RebuildServer => "rebuild_server",
            Self::InjectNetworkInfo => "inject_network_info",
            Self::ShowFlavor => "show_flavor",
        }
    }

    /// The only success code the call may return.
    pub const fn expected_status(&self) -> u16 {
        match self {
            Self::ShowServer
            | Self::ListServers
            | Self::ListServersDetail
            | Self::UpdateServer
            | Self::ShowFlavor => 200,
            Self::CreateServer
            | Self::ResetState
            | Self::RebuildServer
            | Self::InjectNetworkInfo => 202,
            Self::DeleteServer => 204,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
