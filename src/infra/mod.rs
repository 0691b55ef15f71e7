// Adapters behind the application ports.
pub mod analytics;
pub mod csv_store;
#[cfg(test)]
pub mod in_memory;
pub mod insight_adapter;
pub mod notifier;
pub mod openai_client;
pub mod operations;

pub use analytics::RepositoryAnalytics;
pub use csv_store::CsvStore;
#[cfg(test)]
pub use in_memory::InMemoryRepository;
pub use insight_adapter::LlmInsightAdapter;
pub use notifier::TracingNotifier;
pub use openai_client::OpenAiClient;
pub use operations::InMemoryOperations;
