pub mod breed;
pub mod classification;
pub mod item;

pub use breed::{all_breeds, compare_with_catalogue, is_known_breed, CatalogueDiff, BREED_COUNT};
pub use classification::{
    BreedPrediction, ClassificationResult, RankedPrediction, StageDescriptor, STAGE_COUNT,
};
pub use item::{Item, ItemId, LifecycleState, PreviewHandle, SourceAsset};
