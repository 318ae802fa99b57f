// Application state for HTTP handlers
use crate::application::analysis_service::AnalysisService;
use crate::application::comparison_service::ComparisonService;

#[derive(Clone)]
pub struct AppState {
    pub analysis_service: AnalysisService,
    pub comparison_service: ComparisonService,
}
