// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Query contract: a key/value list of opaque query records.
//!
//! The list behaves like a map only as far as `update` makes it one. Spawn
//! appends every argument without checking for existing keys, so duplicates
//! can exist, and `update` treats them asymmetrically:
//!
//! - empty value: the first matching record is removed, later ones are kept;
//! - non-empty value: every matching record is overwritten;
//! - no match: the pair is appended.

use medchain_core::{
    decode_record, encode_record, Arguments, Coin, Contract, ContractError, ContractId, ContractOutput,
    Instruction, ReadOnlyStateTrie,
};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{create_instance, remove_instance, update_instance};

/// Contract-type tag of the query contract.
pub const QUERY_CONTRACT_ID: &str = "queryContract";

/// One stored query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Query id.
    pub id: String,
    /// Opaque query payload.
    pub value: Vec<u8>,
}

/// Stored record of a query instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryData {
    /// Queries in stored order.
    pub storage: Vec<Query>,
}

impl QueryData {
    /// Appends one query per argument, in argument order, with no key check.
    pub fn extend_from_args(&mut self, args: &Arguments) {
        self.storage.extend(args.iter().map(|arg| Query {
            id: arg.name.clone(),
            value: arg.value.clone(),
        }));
    }

    /// Applies each argument as an upsert-or-delete, in argument order.
    pub fn update(&mut self, args: &Arguments) {
        for arg in args {
            if arg.value.is_empty() {
                if let Some(idx) = self.storage.iter().position(|q| q.id == arg.name) {
                    self.storage.remove(idx);
                    continue;
                }
            } else {
                let mut matched = false;
                for q in self.storage.iter_mut().filter(|q| q.id == arg.name) {
                    q.value.clone_from(&arg.value);
                    matched = true;
                }
                if matched {
                    continue;
                }
            }
            self.storage.push(Query {
                id: arg.name.clone(),
                value: arg.value.clone(),
            });
        }
    }

    /// Value of the first query with `id`.
    pub fn get(&self, id: &str) -> Option<&[u8]> {
        self.storage
            .iter()
            .find(|q| q.id == id)
            .map(|q| q.value.as_slice())
    }
}

/// Commands understood by [`QueryContract::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCommand {
    /// Upsert-or-delete every argument.
    Update,
}

impl QueryCommand {
    /// Parses a command name.
    ///
    /// # Errors
    ///
    /// [`ContractError::UnsupportedCommand`] for anything but `update`.
    pub fn parse(command: &str) -> Result<Self, ContractError> {
        match command {
            "update" => Ok(Self::Update),
            other => Err(ContractError::UnsupportedCommand {
                contract: ContractId::new(QUERY_CONTRACT_ID),
                command: other.to_owned(),
            }),
        }
    }
}

/// The query contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryContract;

impl QueryContract {
    /// Factory suitable for [`medchain_core::ContractRegistry::register`].
    pub fn boxed() -> Box<dyn Contract> {
        Box::new(Self)
    }
}

impl Contract for QueryContract {
    fn contract_id(&self) -> ContractId {
        ContractId::new(QUERY_CONTRACT_ID)
    }

    fn spawn(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        let mut data = QueryData::default();
        data.extend_from_args(inst.args());
        let value = encode_record(&data).map_err(ContractError::encode)?;
        create_instance(QUERY_CONTRACT_ID, snapshot, inst, value, coins)
    }

    fn invoke(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        let entry = snapshot.get_values(&inst.instance_id)?;
        match QueryCommand::parse(inst.command().unwrap_or_default())? {
            QueryCommand::Update => {
                let mut data: QueryData =
                    decode_record(&entry.value).map_err(ContractError::decode)?;
                data.update(inst.args());
                update_instance(QUERY_CONTRACT_ID, inst, entry.darc_id, &data, coins)
            }
        }
    }

    fn delete(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        remove_instance(QUERY_CONTRACT_ID, snapshot, inst, coins)
    }
}
