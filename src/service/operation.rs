/// Upward-facing operations, mapped 1:1 onto REST verbs and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateLoad,
    ListLoads,
    GetLoad,
    UpdateLoad,
    DeleteLoad,
    RequestQuote,
    CreateTender,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::CreateLoad,
        Operation::ListLoads,
        Operation::GetLoad,
        Operation::UpdateLoad,
        Operation::DeleteLoad,
        Operation::RequestQuote,
        Operation::CreateTender,
    ];

    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateLoad | Self::RequestQuote | Self::CreateTender => "POST",
            Self::ListLoads | Self::GetLoad => "GET",
            Self::UpdateLoad => "PUT",
            Self::DeleteLoad => "DELETE",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::CreateLoad | Self::ListLoads => "/loads",
            Self::GetLoad | Self::UpdateLoad | Self::DeleteLoad => "/loads/:id",
            Self::RequestQuote => "/loads/:id/quote",
            Self::CreateTender => "/loads/:id/tender",
        }
    }

    /// Status code for a successful call
    pub fn success_status(&self) -> u16 {
        match self {
            Self::CreateLoad | Self::RequestQuote | Self::CreateTender => 201,
            Self::ListLoads | Self::GetLoad | Self::UpdateLoad => 200,
            Self::DeleteLoad => 204,
        }
    }
}
