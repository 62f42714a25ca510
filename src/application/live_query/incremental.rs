use crate::shared::config::ViewportConfig;

/// 一覧を少しずつ表示するためのローダー
///
/// 最初は `initial` 件、番兵要素が見えるたびに `increment` 件ずつ表示を増やす。
/// 元の一覧が差し替わっても表示件数は可能な限り維持し、縮んだ場合だけ初期件数に戻す。
#[derive(Debug, Clone)]
pub struct IncrementalLoader<T> {
    items: Vec<T>,
    initial: usize,
    increment: usize,
    visible: usize,
}

impl<T> IncrementalLoader<T> {
    pub fn new(initial: usize, increment: usize) -> Self {
        Self {
            items: Vec::new(),
            initial,
            increment: increment.max(1),
            visible: 0,
        }
    }

    pub fn from_config(config: &ViewportConfig) -> Self {
        Self::new(config.initial_count, config.increment)
    }

    /// 元の一覧を差し替える
    pub fn set_items(&mut self, items: Vec<T>) {
        let len = items.len();
        self.items = items;
        if len < self.visible || self.visible < self.initial {
            self.visible = self.initial.min(len);
        }
    }

    /// 番兵が見えた。表示件数が増えたら true
    pub fn on_sentinel_visible(&mut self) -> bool {
        let next = (self.visible + self.increment).min(self.items.len());
        let grew = next > self.visible;
        self.visible = next;
        grew
    }

    /// IntersectionObserver 相当の通知
    pub fn on_intersection(&mut self, is_intersecting: bool) -> bool {
        is_intersecting && self.on_sentinel_visible()
    }

    pub fn visible_items(&self) -> &[T] {
        &self.items[..self.visible]
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_increment_until_exhausted() {
        let mut loader = IncrementalLoader::new(12, 8);
        loader.set_items((0..50).collect());

        let mut counts = vec![loader.visible_count()];
        while loader.on_sentinel_visible() {
            counts.push(loader.visible_count());
        }

        assert_eq!(counts, vec![12, 20, 28, 36, 44, 50]);
        assert!(!loader.has_more());
        assert_eq!(loader.visible_items().last(), Some(&49));
    }

    #[test]
    fn non_intersecting_notification_is_ignored() {
        let mut loader = IncrementalLoader::new(2, 2);
        loader.set_items(vec!["a", "b", "c"]);

        assert!(!loader.on_intersection(false));
        assert_eq!(loader.visible_count(), 2);
        assert!(loader.on_intersection(true));
        assert_eq!(loader.visible_items(), &["a", "b", "c"]);
    }

    #[test]
    fn refresh_keeps_expanded_window() {
        let mut loader = IncrementalLoader::new(12, 8);
        loader.set_items((0..50).collect());
        loader.on_sentinel_visible();
        loader.on_sentinel_visible();
        assert_eq!(loader.visible_count(), 28);

        loader.set_items((0..60).collect());
        assert_eq!(loader.visible_count(), 28);
    }

    #[test]
    fn shrinking_list_resets_to_initial_window() {
        let mut loader = IncrementalLoader::new(12, 8);
        loader.set_items((0..50).collect());
        loader.on_sentinel_visible();
        loader.on_sentinel_visible();

        loader.set_items((0..20).collect());
        assert_eq!(loader.visible_count(), 12);

        loader.set_items((0..5).collect());
        assert_eq!(loader.visible_count(), 5);

        loader.set_items((0..30).collect());
        assert_eq!(loader.visible_count(), 12);
    }

    #[test]
    fn default_viewport_config_drives_loader() {
        let config = crate::shared::config::AppConfig::default().viewport;
        let mut loader = IncrementalLoader::<u32>::from_config(&config);
        loader.set_items((0..100).collect());
        assert_eq!(loader.visible_count(), config.initial_count);
    }
}
