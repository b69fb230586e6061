pub mod classifier;
pub mod lexicon;
pub mod normalizer;
pub mod pipeline;
pub mod vader;
