//! Business logic services

pub mod checkmk;
pub mod conditions;
pub mod engine;
pub mod filter;
pub mod folder_pool;
pub mod groups;
pub mod import;
pub mod matcher;
pub mod rewrite;
pub mod sync;
pub mod variables;

pub use checkmk::{format_folder_name, CheckmkDraft, CheckmkRules, PoolDecision};
pub use conditions::{CompiledCondition, CompiledConditionSet};
pub use engine::{evaluate_ruleset, CompiledRule, HostContext, OutcomeAccumulator, RuleSet};
pub use filter::FilterAttributes;
pub use folder_pool::{FolderPoolAllocator, PoolCommit};
pub use groups::CheckmkGroups;
pub use import::{import_document, ImportDocument, ImportReport};
pub use matcher::{make_bool, match_named, match_value, Matcher};
pub use rewrite::RewriteAttributes;
pub use sync::{
    AnsibleDebug, AnsibleInventory, CheckmkDebug, CheckmkExport, ExportSummary, HostFailure,
    SyncService,
};
pub use variables::{render_template, CheckmkRulesets, CustomVariables};
