// recently_viewed
pub(super) const UPSERT_VIEW: &str = r#"
    INSERT INTO recently_viewed (id, user_id, listing_id, viewed_at, touch_seq)
    VALUES (?1, ?2, ?3, ?4, (SELECT COALESCE(MAX(touch_seq), 0) + 1 FROM recently_viewed))
    ON CONFLICT(user_id, listing_id) DO UPDATE SET
        viewed_at = excluded.viewed_at,
        touch_seq = excluded.touch_seq
    RETURNING id, user_id, listing_id, viewed_at, touch_seq
"#;

pub(super) const TRIM_VIEWS_TO_CAP: &str = r#"
    DELETE FROM recently_viewed
    WHERE user_id = ?1
      AND id NOT IN (
          SELECT id
          FROM recently_viewed
          WHERE user_id = ?1
          ORDER BY viewed_at DESC, touch_seq DESC
          LIMIT ?2
      )
"#;

pub(super) const SELECT_RECENT_VIEWS: &str = r#"
    SELECT id, user_id, listing_id, viewed_at, touch_seq
    FROM recently_viewed
    WHERE user_id = ?1
    ORDER BY viewed_at DESC, touch_seq DESC
    LIMIT ?2
"#;

pub(super) const DELETE_VIEW: &str = r#"
    DELETE FROM recently_viewed
    WHERE user_id = ?1 AND listing_id = ?2
"#;

pub(super) const DELETE_ALL_VIEWS: &str = r#"
    DELETE FROM recently_viewed WHERE user_id = ?1
"#;

// listings
pub(super) const SELECT_LISTING_COLUMNS: &str = r#"
    SELECT id, title, city, monthly_rent, bedrooms, status, image_paths, updated_at
    FROM listings
"#;

pub(super) const SELECT_LISTING_BY_ID: &str = r#"
    SELECT id, title, city, monthly_rent, bedrooms, status, image_paths, updated_at
    FROM listings
    WHERE id = ?1
"#;

pub(super) const UPSERT_LISTING: &str = r#"
    INSERT INTO listings (id, title, city, monthly_rent, bedrooms, status, image_paths, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        city = excluded.city,
        monthly_rent = excluded.monthly_rent,
        bedrooms = excluded.bedrooms,
        status = excluded.status,
        image_paths = excluded.image_paths,
        updated_at = excluded.updated_at
"#;
