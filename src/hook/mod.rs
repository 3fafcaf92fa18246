mod driver;
mod ref_kind;
mod ref_update;

pub use self::{
    driver::{EXIT_FAILURE, EXIT_SUCCESS, HookDriver},
    ref_kind::{Classification, RefKind, classify},
    ref_update::{ChangeType, RefUpdate, is_zero_id},
};
