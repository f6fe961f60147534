// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Access-right contract: an ordered list of `(actor id, access right)` grants.
//!
//! The record is held as a single sequence of [`Grant`]s so the id/right
//! pairing cannot drift. On the wire it is still two parallel sequences,
//! `ids` and `access`, of equal length.
//!
//! Ids are unique as long as they only enter through `add`; a spawn payload is
//! stored verbatim and is not checked.

use medchain_core::{
    decode_record, Coin, Contract, ContractError, ContractId, ContractOutput, Hash, Instruction,
    InstructionVerifier, ReadOnlyStateTrie, VerificationOptions,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::lifecycle::{create_instance, remove_instance, update_instance};

/// Contract-type tag of the access-right contract.
pub const ACCESS_RIGHT_CONTRACT_ID: &str = "accessright";

/// One actor's access right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Actor identifier.
    pub id: String,
    /// Access-right string (opaque to the contract).
    pub access: String,
}

/// Stored record of an access-right instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRight {
    grants: Vec<Grant>,
}

#[derive(Default, Serialize, Deserialize)]
struct AccessRightWire {
    ids: Vec<String>,
    access: Vec<String>,
}

impl Serialize for AccessRight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (ids, access) = self
            .grants
            .iter()
            .map(|g| (g.id.clone(), g.access.clone()))
            .unzip();
        AccessRightWire { ids, access }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AccessRight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = AccessRightWire::deserialize(deserializer)?;
        if wire.ids.len() != wire.access.len() {
            return Err(de::Error::custom(format_args!(
                "ids ({}) and access ({}) differ in length",
                wire.ids.len(),
                wire.access.len()
            )));
        }
        let grants = wire
            .ids
            .into_iter()
            .zip(wire.access)
            .map(|(id, access)| Grant { id, access })
            .collect();
        Ok(Self { grants })
    }
}

impl AccessRight {
    /// Builds a record from `(id, access)` pairs, keeping their order.
    ///
    /// Uniqueness is not checked, mirroring what a spawn payload may contain.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            grants: pairs
                .into_iter()
                .map(|(id, access)| Grant {
                    id: id.into(),
                    access: access.into(),
                })
                .collect(),
        }
    }

    /// Grants in stored order.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Actor ids in stored order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.grants.iter().map(|g| g.id.as_str())
    }

    /// Access rights in stored order.
    pub fn access(&self) -> impl Iterator<Item = &str> {
        self.grants.iter().map(|g| g.access.as_str())
    }

    /// Number of grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Returns `true` when no grant is stored.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Index of the first grant for `id`.
    pub fn find(&self, id: &str) -> Option<usize> {
        self.grants.iter().position(|g| g.id == id)
    }

    /// Appends a grant for a new id.
    ///
    /// # Errors
    ///
    /// [`ContractError::DuplicateId`] if `id` is already present.
    pub fn add(&mut self, id: &str, access: &str) -> Result<(), ContractError> {
        if self.find(id).is_some() {
            return Err(ContractError::DuplicateId(id.to_owned()));
        }
        self.grants.push(Grant {
            id: id.to_owned(),
            access: access.to_owned(),
        });
        Ok(())
    }

    /// Replaces the access right of the first grant for `id`.
    ///
    /// # Errors
    ///
    /// [`ContractError::NotFound`] if `id` is absent.
    pub fn update(&mut self, id: &str, access: &str) -> Result<(), ContractError> {
        let idx = self
            .find(id)
            .ok_or_else(|| ContractError::NotFound(id.to_owned()))?;
        access.clone_into(&mut self.grants[idx].access);
        Ok(())
    }

    /// Removes the first grant for `id`; later grants shift down by one.
    ///
    /// # Errors
    ///
    /// [`ContractError::NotFound`] if `id` is absent.
    pub fn remove(&mut self, id: &str) -> Result<Grant, ContractError> {
        let idx = self
            .find(id)
            .ok_or_else(|| ContractError::NotFound(id.to_owned()))?;
        Ok(self.grants.remove(idx))
    }
}

/// Commands understood by [`AccessRightContract::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRightCommand {
    /// Register a new id (`id`, `ar`).
    Add,
    /// Change the right of an existing id (`id`, `ar`).
    Update,
    /// Drop an existing id (`id`).
    Delete,
}

impl AccessRightCommand {
    /// Parses a command name.
    ///
    /// # Errors
    ///
    /// [`ContractError::UnsupportedCommand`] for any other name.
    pub fn parse(command: &str) -> Result<Self, ContractError> {
        match command {
            "add" => Ok(Self::Add),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(ContractError::UnsupportedCommand {
                contract: ContractId::new(ACCESS_RIGHT_CONTRACT_ID),
                command: other.to_owned(),
            }),
        }
    }

    /// Applies the command to `record` with the given arguments.
    ///
    /// # Errors
    ///
    /// Whatever the underlying record operation reports.
    pub fn apply(self, record: &mut AccessRight, id: &str, access: &str) -> Result<(), ContractError> {
        match self {
            Self::Add => record.add(id, access),
            Self::Update => record.update(id, access),
            Self::Delete => record.remove(id).map(|_| ()),
        }
    }
}

/// The access-right contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessRightContract;

impl AccessRightContract {
    /// Factory suitable for [`medchain_core::ContractRegistry::register`].
    pub fn boxed() -> Box<dyn Contract> {
        Box::new(Self)
    }
}

fn arg_string(inst: &Instruction, name: &str) -> String {
    String::from_utf8_lossy(inst.args().search(name)).into_owned()
}

impl Contract for AccessRightContract {
    fn contract_id(&self) -> ContractId {
        ContractId::new(ACCESS_RIGHT_CONTRACT_ID)
    }

    /// Stores the raw `ar` argument as the initial value.
    fn spawn(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        let value = inst.args().search("ar").to_vec();
        create_instance(ACCESS_RIGHT_CONTRACT_ID, snapshot, inst, value, coins)
    }

    fn invoke(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        let entry = snapshot.get_values(&inst.instance_id)?;
        let command = AccessRightCommand::parse(inst.command().unwrap_or_default())?;

        let mut record: AccessRight = decode_record(&entry.value).map_err(ContractError::decode)?;
        command.apply(&mut record, &arg_string(inst, "id"), &arg_string(inst, "ar"))?;

        update_instance(ACCESS_RIGHT_CONTRACT_ID, inst, entry.darc_id, &record, coins)
    }

    fn delete(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        coins: Vec<Coin>,
    ) -> Result<ContractOutput, ContractError> {
        remove_instance(ACCESS_RIGHT_CONTRACT_ID, snapshot, inst, coins)
    }

    /// Deferred instructions are checked with replay counters ignored: the
    /// counters a signer had when the instruction was proposed are usually
    /// stale by the time the last signature arrives.
    fn verify_deferred_instruction(
        &self,
        snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        ctx_hash: &Hash,
        verifier: &dyn InstructionVerifier,
    ) -> Result<(), ContractError> {
        verifier.verify(
            snapshot,
            inst,
            ctx_hash,
            VerificationOptions {
                ignore_counters: true,
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use medchain_core::{encode_record, CodecError};

    fn record(pairs: &[(&str, &str)]) -> AccessRight {
        AccessRight::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn add_appends_last() {
        let mut r = record(&[("u1", "read")]);
        r.add("u2", "write").unwrap();
        assert_eq!(r.ids().collect::<Vec<_>>(), ["u1", "u2"]);
        assert_eq!(r.access().collect::<Vec<_>>(), ["read", "write"]);
    }

    #[test]
    fn add_rejects_existing_id() {
        let mut r = record(&[("u1", "read")]);
        let err = r.add("u1", "write").unwrap_err();
        assert_eq!(err, ContractError::DuplicateId("u1".into()));
        assert_eq!(r, record(&[("u1", "read")]));
    }

    #[test]
    fn update_touches_only_matching_access() {
        let mut r = record(&[("u1", "read"), ("u2", "read")]);
        r.update("u2", "admin").unwrap();
        assert_eq!(r, record(&[("u1", "read"), ("u2", "admin")]));
    }

    #[test]
    fn update_and_delete_reject_missing_id() {
        let mut r = record(&[("u1", "read")]);
        assert_eq!(r.update("u9", "x"), Err(ContractError::NotFound("u9".into())));
        assert!(matches!(r.remove("u9"), Err(ContractError::NotFound(_))));
    }

    #[test]
    fn delete_shifts_later_entries_down() {
        let mut r = record(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let removed = r.remove("b").unwrap();
        assert_eq!(removed.access, "2");
        assert_eq!(r, record(&[("a", "1"), ("c", "3")]));
    }

    #[test]
    fn duplicate_ids_from_spawn_resolve_to_first_match() {
        let mut r = record(&[("dup", "a"), ("dup", "b")]);
        r.remove("dup").unwrap();
        assert_eq!(r, record(&[("dup", "b")]));
    }

    #[test]
    fn unknown_command_is_unsupported() {
        let err = AccessRightCommand::parse("grant").unwrap_err();
        assert!(matches!(
            err,
            ContractError::UnsupportedCommand { ref command, .. } if command == "grant"
        ));
    }

    #[test]
    fn mismatched_wire_sequences_fail_to_decode() {
        let wire = AccessRightWire {
            ids: vec!["u1".into(), "u2".into()],
            access: vec!["read".into()],
        };
        let buf = encode_record(&wire).unwrap();
        let err = decode_record::<AccessRight>(&buf).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn record_round_trips_through_parallel_wire_shape() {
        let r = record(&[("u1", "read"), ("u2", "write")]);
        let buf = encode_record(&r).unwrap();
        let wire: AccessRightWire = decode_record(&buf).unwrap();
        assert_eq!(wire.ids, ["u1", "u2"]);
        assert_eq!(wire.access, ["read", "write"]);
        assert_eq!(decode_record::<AccessRight>(&buf).unwrap(), r);
    }
}
