use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusComparison {
    pub equal: bool,
    pub left: u16,
    pub right: u16,
}

pub fn compare_status(left: u16, right: u16) -> StatusComparison {
    StatusComparison {
        equal: left == right,
        left,
        right,
    }
}
