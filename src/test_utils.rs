//! Test doubles for the two-page view
//!
//! `RecordingHost` counts every collaborator call and keeps the arguments of
//! the last one; `RecordingLoader` keeps requests and their tickets so a test
//! decides when (and how) each load finishes.

pub mod test_helpers {
    use std::collections::BTreeMap;
    use std::ops::RangeInclusive;

    use crate::book::{Book, Manifest, PageProgression, PageRecord};
    use crate::spread::{
        BoxStyle, ContainerHost, ContainerSize, DisplayedIndices, FlipAnimator, ImageLoader,
        ImageRequest, InteractionBinder, LeafElement, LeafSurface, LoadError, LoadTicket,
        ModeClasses, PopUpSurface, SpreadElement, StateClassSink, StyleSink, TwoPageConfig,
        TwoPageView, ViewCenter,
    };

    /// Six 123x123 pages laid out as `[[0], [1, 2], [3, 4], [5]]`
    pub const SAMPLE_DATA: &str = r#"{
        "data": [
            [{"width": 123, "height": 123, "uri": "https://archive.org/image0.jpg", "pageNum": "1"}],
            [
                {"width": 123, "height": 123, "uri": "https://archive.org/image1.jpg", "pageNum": "2"},
                {"width": 123, "height": 123, "uri": "https://archive.org/image2.jpg", "pageNum": "3"}
            ],
            [
                {"width": 123, "height": 123, "uri": "https://archive.org/image3.jpg", "pageNum": "4"},
                {"width": 123, "height": 123, "uri": "https://archive.org/image4.jpg", "pageNum": "5"}
            ],
            [{"width": 123, "height": 123, "uri": "https://archive.org/image5.jpg", "pageNum": "6"}]
        ]
    }"#;

    pub fn sample_book() -> Book {
        Book::from_json(SAMPLE_DATA).expect("sample manifest is valid")
    }

    /// A book of `count` single-page spreads with the given size
    pub fn uniform_book(count: usize, width: u32, height: u32) -> Book {
        let data = (0..count)
            .map(|i| {
                vec![PageRecord {
                    width,
                    height,
                    uri: format!("page{i}.jpg"),
                    page_num: Some((i + 1).to_string()),
                    viewable: true,
                    page_side: None,
                }]
            })
            .collect();
        Book::from_manifest(Manifest {
            page_progression: PageProgression::Lr,
            data,
        })
        .expect("uniform book is valid")
    }

    /// Host double with a settable container
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub container: ContainerSize,
        pub center: ViewCenter,
        pub styles: BTreeMap<&'static str, BoxStyle>,
        pub style_calls: usize,
        pub resize_container_calls: usize,
        pub build_leaves_calls: usize,
        pub last_leaves: Option<(LeafElement, LeafElement)>,
        pub repainted: Vec<usize>,
        pub prune_calls: usize,
        pub last_prune: Option<(DisplayedIndices, RangeInclusive<isize>)>,
        pub bind_gestures_calls: usize,
        pub pop_up_calls: usize,
        pub stop_animation_calls: usize,
        pub update_classes_calls: usize,
        pub classes: Option<ModeClasses>,
        pub scrolls: Vec<(i64, i64)>,
    }

    impl RecordingHost {
        pub fn with_container(width: u32, height: u32) -> Self {
            Self {
                container: ContainerSize::new(width, height),
                ..Self::default()
            }
        }

        /// Forget every recorded call, keeping the container and centre
        pub fn reset_counts(&mut self) {
            *self = Self {
                container: self.container,
                center: self.center,
                ..Self::default()
            };
        }

        pub fn style(&self, element: SpreadElement) -> Option<&BoxStyle> {
            self.styles.get(element.as_str())
        }
    }

    impl StyleSink for RecordingHost {
        fn apply_style(&mut self, element: SpreadElement, style: &BoxStyle) {
            self.style_calls += 1;
            self.styles.insert(element.as_str(), style.clone());
        }
    }

    impl ContainerHost for RecordingHost {
        fn container_size(&self) -> ContainerSize {
            self.container
        }

        fn resize_container(&mut self) -> ContainerSize {
            self.resize_container_calls += 1;
            self.container
        }

        fn view_center(&self) -> ViewCenter {
            self.center
        }

        fn scroll_to(&mut self, left: i64, top: i64) {
            self.scrolls.push((left, top));
        }
    }

    impl LeafSurface for RecordingHost {
        fn build_leaves(&mut self, left: &LeafElement, right: &LeafElement) {
            self.build_leaves_calls += 1;
            self.last_leaves = Some((left.clone(), right.clone()));
        }

        fn repaint_leaf(&mut self, index: usize) {
            self.repainted.push(index);
        }

        fn prune_unused_imgs(&mut self, displayed: DisplayedIndices, keep: RangeInclusive<isize>) {
            self.prune_calls += 1;
            self.last_prune = Some((displayed, keep));
        }
    }

    impl InteractionBinder for RecordingHost {
        fn bind_gestures(&mut self) {
            self.bind_gestures_calls += 1;
        }
    }

    impl PopUpSurface for RecordingHost {
        fn prepare_pop_up(&mut self, _displayed: DisplayedIndices) {
            self.pop_up_calls += 1;
        }
    }

    impl FlipAnimator for RecordingHost {
        fn stop_flip_animations(&mut self) {
            self.stop_animation_calls += 1;
        }
    }

    impl StateClassSink for RecordingHost {
        fn update_br_classes(&mut self, classes: ModeClasses) {
            self.update_classes_calls += 1;
            self.classes = Some(classes);
        }
    }

    /// Loader double that never finishes a load on its own
    #[derive(Debug, Default)]
    pub struct RecordingLoader {
        pub requests: Vec<ImageRequest>,
        tickets: Vec<LoadTicket>,
    }

    impl RecordingLoader {
        pub fn requested_indices(&self) -> Vec<usize> {
            self.requests.iter().map(|r| r.index).collect()
        }

        pub fn pending(&self) -> usize {
            self.tickets.len()
        }

        /// Finish the pending load for `index`; returns whether one existed
        pub fn complete(&mut self, index: usize, outcome: Result<(), LoadError>) -> bool {
            match self.tickets.iter().position(|t| t.index() == index) {
                Some(pos) => {
                    self.tickets.remove(pos).complete(outcome);
                    true
                }
                None => false,
            }
        }

        pub fn complete_all(&mut self) {
            for ticket in self.tickets.drain(..) {
                ticket.complete(Ok(()));
            }
        }
    }

    impl ImageLoader for RecordingLoader {
        fn load(&mut self, request: ImageRequest, ticket: LoadTicket) {
            self.requests.push(request);
            self.tickets.push(ticket);
        }
    }

    pub type TestView = TwoPageView<RecordingHost, RecordingLoader>;

    /// Sample book in a 1000x800 container, initialised
    pub fn sample_view() -> TestView {
        view_with(sample_book(), 1000, 800)
    }

    pub fn view_with(book: Book, width: u32, height: u32) -> TestView {
        let mut view = TwoPageView::new(
            book,
            TwoPageConfig::default(),
            RecordingHost::with_container(width, height),
            RecordingLoader::default(),
        );
        view.init().expect("container is usable");
        view
    }
}
