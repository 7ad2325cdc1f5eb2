pub mod consequence_processor;
