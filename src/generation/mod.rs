pub mod assembler;
pub mod codec;
pub mod executor;
pub mod invoker;
pub mod orchestrator;
pub mod pacing;
pub mod plan;
pub mod seed;

pub use assembler::{assemble, BatchParams};
pub use executor::{UnitEvent, UnitExecutor, UnitState};
pub use invoker::ModelInvoker;
pub use orchestrator::{BatchJob, BatchOrchestrator};
pub use pacing::{Pacer, RecordingPacer, TokioPacer};
pub use plan::{clamp_temperature, plans_for, PLAN_COUNT};
pub use seed::{SeedAllocator, SEED_LIMIT};
