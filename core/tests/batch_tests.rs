// tests/batch_tests.rs
mod common;
use common::*;
use exbuy::{assemble_order, fetch_order, BatchOrderProcessor, CoreError, LockStrategy, OrderRequest, Store};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_batch_checks_stock_across_orders() {
  setup_tracing();
  let (store, products) = seeded_store(&[("Product A", dec!(10.00), 5)]);
  let a = products[0].id;
  let orders = vec![OrderRequest::new(1).item(a, 3), OrderRequest::new(2).item(a, 3)];

  let err = BatchOrderProcessor::default()
    .process(&store, &orders, LockStrategy::Optimistic)
    .await
    .unwrap_err();
  match err {
    CoreError::InsufficientStock {
      product_id,
      requested,
      available,
      order_index,
    } => {
      assert_eq!(product_id, a);
      assert_eq!(requested, 3);
      assert_eq!(available, 2);
      assert_eq!(order_index, Some(1));
    }
    other => panic!("Expected InsufficientStock, got {:?}", other),
  }
  assert_eq!(stock_of(&store, a), 5);
  assert!(store.orders().is_empty());
  assert!(store.order_items().is_empty());
}

#[tokio::test]
async fn test_failure_midway_leaves_nothing_behind() {
  setup_tracing();
  let (store, products) = seeded_store(&[("Widget", dec!(2.50), 100), ("Gadget", dec!(9.99), 1)]);
  let (widget, gadget) = (products[0].id, products[1].id);

  let mut orders: Vec<_> = (0..10).map(|user| OrderRequest::new(user).item(widget, 2)).collect();
  orders[3] = OrderRequest::new(3).item(widget, 1).item(gadget, 1);
  orders[4] = OrderRequest::new(4).item(gadget, 1);

  for strategy in [LockStrategy::Optimistic, LockStrategy::Pessimistic] {
    let err = BatchOrderProcessor::default()
      .process(&store, &orders, strategy)
      .await
      .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientStock { order_index: Some(4), .. }));
    assert_eq!(stock_of(&store, widget), 100);
    assert_eq!(stock_of(&store, gadget), 1);
    assert!(store.orders().is_empty());
  }
}

#[tokio::test]
async fn test_successful_batch_creates_every_order() {
  setup_tracing();
  let (store, products) = seeded_store(&[("Tea", dec!(4.20), 20), ("Honey", dec!(6.00), 5)]);
  let (tea, honey) = (products[0].id, products[1].id);
  let orders = vec![
    OrderRequest::new(1).item(tea, 2),
    OrderRequest::new(2).item(honey, 1).item(tea, 1).item(honey, 2),
    OrderRequest::new(3).item(tea, 5),
  ];

  let outcome = BatchOrderProcessor::default()
    .process(&store, &orders, LockStrategy::Pessimistic)
    .await
    .unwrap();
  assert_eq!(outcome.created, 3);
  assert_eq!(outcome.order_ids.len(), 3);

  let mut totals = Vec::new();
  for (order_id, request) in outcome.order_ids.iter().zip(&orders) {
    let detail = fetch_order(&store, *order_id).await.unwrap();
    assert_eq!(detail.order.user_id, request.user_id);
    assert_eq!(detail.items.len(), request.items.len());
    assert_eq!(detail.order.total_price, detail.lines_total());
    totals.push(detail.order.total_price);
  }
  assert_eq!(totals, vec![dec!(8.40), dec!(22.20), dec!(21.00)]);

  assert_eq!(stock_of(&store, tea), 12);
  assert_eq!(stock_of(&store, honey), 2);
  assert_eq!(store.order_items().len(), 5);
}

#[tokio::test]
async fn test_missing_product_fails_whole_batch() {
  setup_tracing();
  let (store, products) = seeded_store(&[("Soap", dec!(3.00), 10)]);
  let orders = vec![
    OrderRequest::new(1).item(products[0].id, 1),
    OrderRequest::new(2).item(77, 1),
  ];

  let err = BatchOrderProcessor::default()
    .process(&store, &orders, LockStrategy::Optimistic)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::ProductNotFound { product_id: 77 }));
  assert_eq!(stock_of(&store, products[0].id), 10);
  assert!(store.orders().is_empty());
}

#[tokio::test]
async fn test_batch_size_limits() {
  setup_tracing();
  let (store, products) = seeded_store(&[("Sticker", dec!(0.50), 5000)]);
  let sticker = products[0].id;

  let outcome = BatchOrderProcessor::default()
    .process(&store, &[], LockStrategy::Optimistic)
    .await
    .unwrap();
  assert_eq!(outcome.created, 0);
  assert!(outcome.order_ids.is_empty());

  let at_cap: Vec<_> = (0..1000).map(|user| OrderRequest::new(user).item(sticker, 1)).collect();
  let outcome = BatchOrderProcessor::default()
    .process(&store, &at_cap, LockStrategy::Optimistic)
    .await
    .unwrap();
  assert_eq!(outcome.created, 1000);
  assert_eq!(stock_of(&store, sticker), 4000);

  let over_cap: Vec<_> = (0..1001).map(|user| OrderRequest::new(user).item(sticker, 1)).collect();
  let err = BatchOrderProcessor::default()
    .process(&store, &over_cap, LockStrategy::Optimistic)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Validation(_)));
  assert_eq!(stock_of(&store, sticker), 4000);

  let small = BatchOrderProcessor::new(2);
  assert!(matches!(
    small.process(&store, &at_cap[..3], LockStrategy::Pessimistic).await,
    Err(CoreError::Validation(_))
  ));
}

#[tokio::test]
async fn test_short_item_insert_is_a_store_error_on_both_paths() {
  setup_tracing();
  let (store, products) = seeded_store(&[("Rope", dec!(5.00), 10)]);
  let rope = products[0].id;
  let orders = vec![OrderRequest::new(1).item(rope, 1), OrderRequest::new(2).item(rope, 2)];

  let mut tx = ShortItemsTx(store.begin().await.unwrap());
  let err = BatchOrderProcessor::default()
    .process_in(&mut tx, &orders, LockStrategy::Optimistic)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Store { .. }), "got {:?}", err);
  drop(tx);

  let mut tx = ShortItemsTx(store.begin().await.unwrap());
  let err = assemble_order(&mut tx, &orders[1], LockStrategy::Pessimistic)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Store { .. }), "got {:?}", err);
  drop(tx);

  assert_eq!(stock_of(&store, rope), 10);
  assert!(store.orders().is_empty());
  assert!(store.order_items().is_empty());
}
