/*!
 * Bilingual document handling.
 *
 * - `model`: files, units and segment fragments exposed to callers
 * - `loader`: parsing and model extraction
 * - `writer`: patching target markers and serializing
 * - `index`: addresses used to locate nodes on write-back
 */

pub mod index;
pub mod loader;
pub mod model;
pub mod writer;

pub use index::{NodeAddress, NodeIndex};
pub use loader::LoaderOptions;
pub use model::{
    Document, FileUnit, FragmentContent, PlaceholderFragment, SegmentDefinition, SegmentFragment,
    TranslationUnit, SDL_NAMESPACE, XLIFF_NAMESPACE,
};
