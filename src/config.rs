use ad_rewriter::RewriterConfig;
use adweave_core_types::RootNode;
use adweave_scheduler::SchedulerConfig;
use frame_bridge::BridgeConfig;

#[derive(Clone, Debug)]
pub struct ElementConfig {
    /// Key the component owns inside every ad element's targeting map.
    pub targeting_key: String,
    /// Root the scan cycle covers; subtree roots support shadow embedding.
    pub root: RootNode,
    pub rewriter: RewriterConfig,
    pub bridge: BridgeConfig,
    pub scheduler: SchedulerConfig,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            targeting_key: "audience".to_string(),
            root: RootNode::Document,
            rewriter: RewriterConfig::default(),
            bridge: BridgeConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}
