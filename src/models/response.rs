use serde::Serialize;

use super::{
    DashboardMetadata, DashboardStats, GraphMetadata, NetworkGraph, TrendMetadata, TrendReport,
    TrendSeries,
};

/// JSON envelope shared by every analytics output.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<D, M> {
    Success { data: D, metadata: M },
    Error { message: String },
}

impl ApiResponse<(), ()> {
    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendData {
    pub categories: Vec<String>,
    pub series: Vec<TrendSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub stats: DashboardStats,
    pub metadata: DashboardMetadata,
}

impl From<NetworkGraph> for ApiResponse<Vec<(String, String)>, GraphMetadata> {
    fn from(graph: NetworkGraph) -> Self {
        ApiResponse::Success {
            data: graph.edges,
            metadata: graph.metadata,
        }
    }
}

impl From<TrendReport> for ApiResponse<TrendData, TrendMetadata> {
    fn from(report: TrendReport) -> Self {
        ApiResponse::Success {
            data: TrendData {
                categories: report.categories,
                series: report.series,
            },
            metadata: report.metadata,
        }
    }
}

impl From<DashboardReport> for ApiResponse<DashboardStats, DashboardMetadata> {
    fn from(report: DashboardReport) -> Self {
        ApiResponse::Success {
            data: report.stats,
            metadata: report.metadata,
        }
    }
}
