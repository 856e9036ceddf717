use serde::{Deserialize, Serialize};

use crate::domain::party::BusinessId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recycler {
    pub id: BusinessId,
    pub name: String,
    pub address: String,
    pub mobile: String,
    pub website: String,
}

/// Recyclers an individual can pick from when requesting a pickup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecyclerDirectory {
    recyclers: Vec<Recycler>,
}

impl RecyclerDirectory {
    pub fn new(recyclers: Vec<Recycler>) -> Self {
        Self { recyclers }
    }

    pub fn all(&self) -> &[Recycler] {
        &self.recyclers
    }

    pub fn find(&self, id: &BusinessId) -> Option<&Recycler> {
        self.recyclers.iter().find(|recycler| &recycler.id == id)
    }
}

impl Default for RecyclerDirectory {
    fn default() -> Self {
        Self::new(vec![
            recycler(
                "iZkvD7rbmWMgfZFGN2ylBY92XJa2",
                "Green Moon Waste Management Services",
                "11/1885, Muglisara Main Rd, Surat, Gujarat - 395010",
                "+91 9316877703",
                "https://gmoonwaste.com/",
            ),
            recycler(
                "bhH5O34V5dbGWtWYW1dUBapF4N12",
                "Divine E-Waste Solution",
                "Plot No:818, New GIDC, Old GIDC, Katargam, Surat, Gujarat 395008",
                "09537383637",
                "http://www.divineewaste.in/",
            ),
            recycler(
                "hEU3JUgjXBSYBKdSXGYmrdDicGz2",
                "E-Waste Management Pvt Ltd",
                "97, Vairaginiwadi, Delhigate, nr. Sumilon Ind. Ltd, Manchharpura, Surat, Gujarat 395003",
                "09737318484",
                "http://eemplindia.com/",
            ),
        ])
    }
}

fn recycler(id: &str, name: &str, address: &str, mobile: &str, website: &str) -> Recycler {
    Recycler {
        id: BusinessId(id.to_owned()),
        name: name.to_owned(),
        address: address.to_owned(),
        mobile: mobile.to_owned(),
        website: website.to_owned(),
    }
}
