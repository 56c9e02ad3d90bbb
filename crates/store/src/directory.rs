use fieldbook_types::{Constituency, Mandal, Member, Panchayat};

use crate::error::Result;
use crate::repo::{Repository, StateStore};

/// The four directory collections bundled, with the name lookups the
/// importers resolve units against.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub constituencies: Repository<Constituency>,
    pub mandals: Repository<Mandal>,
    pub panchayats: Repository<Panchayat>,
    pub members: Repository<Member>,
}

impl Directory {
    #[must_use]
    pub fn new() -> Self {
        Directory::default()
    }

    pub fn load(store: &dyn StateStore) -> Result<Self> {
        Ok(Directory {
            constituencies: Repository::load(store)?,
            mandals: Repository::load(store)?,
            panchayats: Repository::load(store)?,
            members: Repository::load(store)?,
        })
    }

    pub fn persist(&self, store: &mut dyn StateStore) -> Result<()> {
        self.constituencies.persist(store)?;
        self.mandals.persist(store)?;
        self.panchayats.persist(store)?;
        self.members.persist(store)?;
        Ok(())
    }

    #[must_use]
    pub fn constituency_by_name(&self, name: &str) -> Option<&Constituency> {
        let name = name.trim();
        self.constituencies.find(|c| c.name == name)
    }

    #[must_use]
    pub fn mandal_by_name(&self, name: &str) -> Option<&Mandal> {
        let name = name.trim();
        self.mandals.find(|m| m.name == name)
    }

    #[must_use]
    pub fn panchayat_by_name(&self, name: &str) -> Option<&Panchayat> {
        let name = name.trim();
        self.panchayats.find(|p| p.name == name)
    }

    #[must_use]
    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        let name = name.trim();
        self.members.find(|m| m.name == name)
    }
}
