use spreadview::ViewerError;
use spreadview::book::{Book, Manifest, PageProgression, PageRecord};
use spreadview::spread::{
    ContainerSize, LoadError, PrefetchScheduler, PrefetchScope, RequestKind, SpreadElement,
    SpreadSlots, Step, TwoPageConfig, TwoPageView, UpdateMode, ZoomDirection,
};
use spreadview::test_utils::test_helpers::{
    RecordingHost, RecordingLoader, sample_book, sample_view, uniform_book, view_with,
};

fn book_with_hidden_run(count: usize, hidden: std::ops::RangeInclusive<usize>) -> Book {
    let data = (0..count)
        .map(|i| {
            vec![PageRecord {
                width: 800,
                height: 1200,
                uri: format!("page{i}.jpg"),
                page_num: None,
                viewable: !hidden.contains(&i),
                page_side: None,
            }]
        })
        .collect();
    Book::from_manifest(Manifest {
        page_progression: PageProgression::Lr,
        data,
    })
    .unwrap()
}

#[test]
fn init_shows_first_page_on_the_right() {
    let view = sample_view();

    assert_eq!(view.displayed_indices(), [-1, 0]);
    assert_eq!(view.last_cycle().mode(), Some(UpdateMode::Redraw));
    assert_eq!(view.last_cycle().count(Step::DrawLeafs), 1);
    assert_eq!(view.host().build_leaves_calls, 1);

    let (left, right) = view.host().last_leaves.clone().unwrap();
    assert_eq!(left.index, None);
    assert_eq!(left.uri, None);
    assert_eq!(right.index, Some(0));
    assert_eq!(right.uri.as_deref(), Some("https://archive.org/image0.jpg"));
}

#[test]
fn init_requires_a_usable_container() {
    let mut view = TwoPageView::new(
        sample_book(),
        TwoPageConfig::default(),
        RecordingHost::with_container(0, 0),
        RecordingLoader::default(),
    );
    let err = view.init().unwrap_err();
    assert!(matches!(
        err,
        ViewerError::MissingContainer {
            width: 0,
            height: 0
        }
    ));
}

#[test]
fn forced_prepare_runs_every_redraw_step_once() {
    let mut view = sample_view();
    view.host_mut().reset_counts();

    let mode = view.prepare_two_page_view(None, None, true);

    let cycle = view.last_cycle();
    assert_eq!(mode, UpdateMode::Redraw);
    assert_eq!(cycle.steps().first(), Some(&Step::StopFlipAnimations));
    assert_eq!(cycle.prefetch_passes(), 2);
    assert_eq!(cycle.count(Step::Prefetch(PrefetchScope::Backward)), 1);
    assert_eq!(cycle.count(Step::Prefetch(PrefetchScope::Forward)), 1);
    for step in [
        Step::StopFlipAnimations,
        Step::DrawLeafs,
        Step::CalculateSpreadSize,
        Step::PruneUnusedImgs,
        Step::BindGestures,
        Step::CenterView,
        Step::PreparePopUp,
        Step::UpdateBrClasses,
    ] {
        assert_eq!(cycle.count(step), 1, "{step:?}");
    }
    assert_eq!(cycle.count(Step::ResizeSpread), 0);

    let host = view.host();
    assert_eq!(host.stop_animation_calls, 1);
    assert_eq!(host.build_leaves_calls, 1);
    assert_eq!(host.prune_calls, 1);
    assert_eq!(host.bind_gestures_calls, 1);
    assert_eq!(host.pop_up_calls, 1);
    assert_eq!(host.update_classes_calls, 1);
    assert_eq!(host.style_calls, SpreadElement::ALL.len());
    assert_eq!(host.scrolls.len(), 1);
    assert_eq!(host.resize_container_calls, 0);
}

#[test]
fn unforced_prepare_without_resolution_change_resizes() {
    let mut view = sample_view();
    view.host_mut().reset_counts();
    let requests_before = view.loader().requests.len();

    let mode = view.prepare_two_page_view(None, None, false);

    let cycle = view.last_cycle();
    assert_eq!(mode, UpdateMode::Resize);
    assert_eq!(cycle.count(Step::ResizeSpread), 1);
    assert_eq!(cycle.count(Step::DrawLeafs), 0);
    assert_eq!(cycle.prefetch_passes(), 0);
    assert_eq!(cycle.count(Step::PruneUnusedImgs), 0);
    assert_eq!(cycle.count(Step::BindGestures), 0);
    assert_eq!(cycle.count(Step::PreparePopUp), 0);

    let host = view.host();
    assert_eq!(host.stop_animation_calls, 1);
    assert_eq!(host.build_leaves_calls, 0);
    assert_eq!(host.prune_calls, 0);
    assert_eq!(host.pop_up_calls, 0);
    assert_eq!(host.update_classes_calls, 0);
    assert_eq!(view.loader().requests.len(), requests_before);
}

#[test]
fn resize_spread_keeps_pages_and_images() {
    let mut view = sample_view();
    view.host_mut().reset_counts();
    let requests_before = view.loader().requests.len();
    let displayed = view.displayed_indices();

    view.resize_spread();

    let cycle = view.last_cycle();
    assert_eq!(cycle.count(Step::ResizeContainer), 1);
    assert_eq!(cycle.count(Step::CalculateSpreadSize), 1);
    assert_eq!(cycle.count(Step::CenterView), 1);
    assert_eq!(cycle.count(Step::DrawLeafs), 0);
    assert_eq!(view.host().resize_container_calls, 1);
    assert_eq!(view.host().build_leaves_calls, 0);
    assert_eq!(view.loader().requests.len(), requests_before);
    assert_eq!(view.displayed_indices(), displayed);
}

#[test]
fn growing_container_redraws_at_finer_resolution() {
    let mut view = sample_view();
    assert_eq!(view.state().zoom.reduce, 0.25);

    view.host_mut().container = ContainerSize::new(2000, 1600);
    assert_eq!(view.handle_resize(), UpdateMode::Redraw);
    assert_eq!(view.state().zoom.reduce, 0.12);

    let last = view.loader().requests.last().unwrap();
    assert_eq!(last.index, 0);
    assert_eq!(last.kind, RequestKind::Display);
    assert_eq!(last.reduce, 0.12);
    assert_eq!(view.prefetch_window().requested_reduce(0), Some(0.12));
}

#[test]
fn shrinking_container_only_resizes() {
    let mut view = sample_view();
    view.host_mut().container = ContainerSize::new(500, 400);

    assert!(!view.should_redraw_spread());
    assert_eq!(view.handle_resize(), UpdateMode::Resize);
    assert_eq!(view.last_cycle().count(Step::ResizeSpread), 1);
    assert_eq!(view.state().container, ContainerSize::new(500, 400));
    assert_eq!(view.geometry().height, 240);
    assert_eq!(view.state().zoom.reduce, 0.51);
}

#[test]
fn zoom_always_redraws_and_stops_animation_once() {
    let mut view = sample_view();
    assert!(!view.should_redraw_spread());

    view.host_mut().reset_counts();
    assert_eq!(view.zoom(ZoomDirection::Out), UpdateMode::Redraw);
    assert_eq!(view.host().stop_animation_calls, 1);
    assert_eq!(view.last_cycle().count(Step::StopFlipAnimations), 1);
    assert_eq!(view.last_cycle().count(Step::ResizeSpread), 0);
    assert_eq!(view.last_cycle().count(Step::DrawLeafs), 1);
    assert_eq!(view.state().zoom.reduce, 0.5);
    assert!(!view.state().zoom.is_autofit());
    assert!(view.host().classes.unwrap().zoomed);

    // a coarser raster than the container needs
    assert!(view.should_redraw_spread());
    view.host_mut().reset_counts();
    assert_eq!(view.zoom(ZoomDirection::In), UpdateMode::Redraw);
    assert_eq!(view.host().stop_animation_calls, 1);
    assert_eq!(view.last_cycle().count(Step::ResizeSpread), 0);
    assert_eq!(view.state().zoom.reduce, 0.25);
    assert!(view.state().zoom.is_autofit());
}

#[test]
fn fixed_zoom_sizes_pages_from_reduce() {
    let mut view = sample_view();
    view.zoom(ZoomDirection::Out);
    view.zoom(ZoomDirection::Out);

    assert_eq!(view.state().zoom.reduce, 1.0);
    assert_eq!(view.geometry().height, 123);
    assert_eq!(view.geometry().scaled_wr, 123);

    view.zoom(ZoomDirection::Fit);
    assert_eq!(view.state().zoom.reduce, 0.25);
    assert_eq!(view.geometry().height, 490);
}

#[test]
fn draw_leafs_overwrites_corrupted_indices() {
    let mut view = sample_view();
    view.force_displayed_indices([42, -7]);
    assert_eq!(view.displayed_indices(), [42, -7]);

    view.draw_leafs();
    assert_eq!(view.displayed_indices(), [-1, 0]);
}

#[test]
fn navigation_walks_spreads_and_clamps() {
    let mut view = sample_view();

    view.next_spread();
    assert_eq!(view.displayed_indices(), [1, 2]);
    view.next_spread();
    assert_eq!(view.displayed_indices(), [3, 4]);
    view.next_spread();
    assert_eq!(view.displayed_indices(), [5, -1]);
    assert!(view.host().classes.unwrap().at_end);

    view.next_spread();
    assert_eq!(view.displayed_indices(), [5, -1]);

    view.jump_to_index(-30);
    assert_eq!(view.displayed_indices(), [-1, 0]);
    assert!(view.host().classes.unwrap().at_start);

    view.jump_to_index(2);
    view.prev_spread();
    assert_eq!(view.displayed_indices(), [-1, 0]);
}

#[test]
fn prepare_anchors_next_selection() {
    let mut view = sample_view();
    view.prepare_two_page_view(Some(3), Some(4), true);
    assert_eq!(view.displayed_indices(), [3, 4]);
}

#[test]
fn resize_cycle_ignores_anchor() {
    let mut view = sample_view();

    let mode = view.prepare_two_page_view(Some(3), Some(4), false);
    assert_eq!(mode, UpdateMode::Resize);
    assert_eq!(view.displayed_indices(), [-1, 0]);

    view.zoom(ZoomDirection::Out);
    assert_eq!(view.displayed_indices(), [-1, 0]);
    assert_eq!(view.state().current_index, 0);
}

#[test]
fn spread_descriptors_keep_field_order() {
    let view = sample_view();
    let styles = view.styles().unwrap();

    assert_eq!(styles.base_leaf.keys(), ["position", "right", "top", "zIndex"]);
    let leaf = [
        "position", "right", "top", "zIndex", "height", "left", "width",
    ];
    assert_eq!(styles.left_leaf.keys(), leaf);
    assert_eq!(styles.right_leaf.keys(), leaf);
    let edge = ["height", "width", "left", "top", "border"];
    assert_eq!(styles.leaf_edge_left.keys(), edge);
    assert_eq!(styles.leaf_edge_right.keys(), edge);
    assert_eq!(styles.main_container.keys(), ["height", "width", "position"]);
    assert_eq!(styles.spread_cover.keys(), ["width", "height", "visibility"]);
    assert_eq!(styles.spine.keys(), ["width", "height", "left", "top"]);

    for element in SpreadElement::ALL {
        assert_eq!(
            view.host().style(element),
            Some(styles.for_element(element)),
            "{element:?}"
        );
    }
    assert_eq!(styles.right_leaf.px("width"), Some(490));
    assert_eq!(styles.main_container.px("width"), Some(980));
}

#[test]
fn interior_jump_prefetches_both_directions() {
    let mut view = view_with(uniform_book(20, 800, 1200), 1000, 800);
    let before = view.loader().requests.len();

    view.jump_to_index(10);

    let prefetched: Vec<usize> = view.loader().requests[before..]
        .iter()
        .filter(|r| r.kind == RequestKind::Prefetch)
        .map(|r| r.index)
        .collect();
    assert!(prefetched.len() > 2);
    assert!(prefetched.iter().any(|&i| i < 9));
    assert!(prefetched.iter().any(|&i| i > 10));
}

#[test]
fn prefetch_issues_more_than_two_at_every_position() {
    for (index, label) in [(0isize, "first"), (10, "interior"), (19, "last")] {
        let mut book = uniform_book(20, 800, 1200);
        let mut loader = RecordingLoader::default();
        let mut scheduler = PrefetchScheduler::new(2);
        let [left, right] = book.spread_indices(index);

        let pass = scheduler.prefetch(
            &mut book,
            SpreadSlots::new(left, right),
            PrefetchScope::Both,
            1.0,
            &mut loader,
        );
        assert!(pass.issued > 2, "{label}: {pass:?}");
        assert!(loader.requests.iter().all(|r| r.index < 20), "{label}");
    }
}

#[test]
fn prefetch_on_fresh_view_starts_at_first_page() {
    let mut view = TwoPageView::new(
        sample_book(),
        TwoPageConfig::default(),
        RecordingHost::with_container(1000, 800),
        RecordingLoader::default(),
    );

    assert_eq!(view.prefetch().issued, 3);
    assert_eq!(view.loader().requested_indices(), vec![0, 1, 2]);
    assert_eq!(view.last_cycle().count(Step::Prefetch(PrefetchScope::Both)), 1);
    assert_eq!(view.prefetch().issued, 0);
}

#[test]
fn prefetch_after_init_offers_pages_already_requested() {
    let mut view = sample_view();
    let requests_before = view.loader().requests.len();

    let pass = view.prefetch();

    assert_eq!(pass.attempted, vec![0, 1, 2]);
    assert_eq!(pass.issued, 0);
    assert_eq!(view.last_cycle().prefetch_img_calls(), pass.attempted);
    assert_eq!(view.loader().requests.len(), requests_before);
}

#[test]
fn prefetch_after_jump_offers_more_than_two_pages() {
    for (index, label) in [(-1isize, "first"), (10, "interior"), (19, "last")] {
        let mut view = view_with(uniform_book(20, 800, 1200), 1000, 800);
        view.jump_to_index(index);
        let jump_offers = view.last_cycle().prefetch_img_calls();
        assert!(jump_offers.len() > 2, "{label}: {jump_offers:?}");

        let pass = view.prefetch();
        let offered = view.last_cycle().prefetch_img_calls();
        assert!(offered.len() > 2, "{label}: {offered:?}");
        assert_eq!(offered, pass.attempted, "{label}");
        assert_eq!(pass.issued, 0, "{label}");
        assert!(view.loader().requests.iter().all(|r| r.index < 20), "{label}");
    }
}

#[test]
fn prefetch_steps_over_non_viewable_run() {
    let mut view = view_with(book_with_hidden_run(14, 3..=7), 1000, 800);
    view.jump_to_index(1);
    view.prefetch();

    let window: Vec<usize> = view.prefetch_window().indices().collect();
    assert!(window.iter().all(|i| !(3..=7).contains(i)), "{window:?}");
    assert!(window.contains(&8));
    assert!(window.contains(&9));
    assert!(view.book().pages()[3..=7].iter().all(|p| !p.is_prefetched()));
}

#[test]
fn non_viewable_page_is_shown_as_absent() {
    let mut view = view_with(book_with_hidden_run(8, 4..=4), 1000, 800);
    view.jump_to_index(3);
    assert_eq!(view.displayed_indices(), [3, -1]);
}

#[test]
fn prefetch_img_marks_before_completion() {
    let mut view = sample_view();
    assert!(view.prefetch_img(4));
    assert!(view.book().page(4).unwrap().is_prefetched());
    assert!(!view.book().page(4).unwrap().is_loaded());
    assert!(!view.prefetch_img(4));
    assert!(!view.prefetch_img(99));
}

#[test]
fn completions_update_pages_without_layout() {
    let mut view = sample_view();
    assert_eq!(view.loader().requested_indices(), vec![0, 1, 2]);
    assert_eq!(view.loader().requests[0].kind, RequestKind::Display);
    let steps_before = view.last_cycle().clone();
    let geometry_before = *view.geometry();

    assert!(view.loader_mut().complete(0, Ok(())));
    assert!(view.loader_mut().complete(1, Err(LoadError::NotFound("image1".into()))));
    assert!(view.loader_mut().complete(2, Ok(())));
    assert_eq!(view.drain_completions(), 3);

    assert!(view.book().page(0).unwrap().is_loaded());
    assert!(!view.book().page(1).unwrap().is_loaded());
    assert!(view.book().page(1).unwrap().is_prefetched());
    assert!(view.book().page(2).unwrap().is_loaded());
    assert_eq!(view.host().repainted, vec![0]);

    assert_eq!(view.displayed_indices(), [-1, 0]);
    assert_eq!(*view.last_cycle(), steps_before);
    assert_eq!(*view.geometry(), geometry_before);
    assert_eq!(view.drain_completions(), 0);
}

#[test]
fn completing_every_pending_load_marks_pages_loaded() {
    let mut view = sample_view();
    assert_eq!(view.loader().pending(), 3);

    view.loader_mut().complete_all();
    assert_eq!(view.loader().pending(), 0);
    assert_eq!(view.drain_completions(), 3);

    assert!(view.book().pages()[0..=2].iter().all(|p| p.is_loaded()));
    assert!(!view.book().page(3).unwrap().is_loaded());
    assert_eq!(view.host().repainted, vec![0]);
}

#[test]
fn stale_completion_after_navigation_is_harmless() {
    let mut view = sample_view();
    view.jump_to_index(3);
    let displayed = view.displayed_indices();

    view.loader_mut().complete(0, Ok(()));
    assert_eq!(view.drain_completions(), 1);

    assert!(view.book().page(0).unwrap().is_loaded());
    assert!(view.host().repainted.is_empty());
    assert_eq!(view.displayed_indices(), displayed);
}

#[test]
fn prune_keeps_margin_around_spread() {
    let mut view = view_with(uniform_book(20, 800, 1200), 1000, 800);
    view.jump_to_index(10);

    let (displayed, keep) = view.host().last_prune.clone().unwrap();
    assert_eq!(displayed, [9, 10]);
    assert_eq!(keep, 5..=14);
}

#[test]
fn zoom_keeps_view_centre() {
    let mut view = view_with(sample_book(), 200, 100);
    assert_eq!(view.state().zoom.reduce, 1.45);

    view.zoom(ZoomDirection::In);
    assert_eq!(view.state().zoom.reduce, 1.0);
    assert_eq!(view.geometry().total_width, 246);
    assert_eq!(view.host().scrolls.last(), Some(&(23, 11)));

    view.host_mut().center = spreadview::spread::ViewCenter { x: 1.0, y: 0.0 };
    view.zoom(ZoomDirection::In);
    assert_eq!(view.state().zoom.reduce, 0.5);
    assert_eq!(view.geometry().total_width, 492);
    assert_eq!(view.host().scrolls.last(), Some(&(392, 0)));
}
