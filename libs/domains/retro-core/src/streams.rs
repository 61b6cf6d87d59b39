use stream_worker::StreamDef;

/// Queue backing session replay rendering. The literal name is load-bearing:
/// it is also the legacy list key that pre-existing deployments migrate from.
pub struct ReplayQueue;

impl StreamDef for ReplayQueue {
    const QUEUE_NAME: &'static str = "replay-jobs";
}

pub struct AnalysisQueue;

impl StreamDef for AnalysisQueue {
    const QUEUE_NAME: &'static str = "analysis-jobs";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_names_are_bit_exact() {
        assert_eq!(ReplayQueue::QUEUE_NAME, "replay-jobs");
        assert_eq!(AnalysisQueue::QUEUE_NAME, "analysis-jobs");
    }
}
