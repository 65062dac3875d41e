//! Mapping of domain values onto page contexts.

use blogicum_core::Page;
use blogicum_core::domain::{Author, Category, CommentCard, Location, PostCard, User};
use blogicum_shared::dto::{
    AuthorView, CategoryView, ChoiceView, CommentView, LocationView, PageView, PostView,
    ProfileView,
};

pub fn author(author: Author) -> AuthorView {
    AuthorView {
        id: author.id,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
    }
}

pub fn category(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        title: category.title,
        slug: category.slug,
        description: category.description,
    }
}

pub fn location(location: Location) -> LocationView {
    LocationView {
        id: location.id,
        name: location.name,
    }
}

pub fn post(card: PostCard) -> PostView {
    let PostCard {
        post,
        author: post_author,
        category: post_category,
        location: post_location,
        comment_count,
    } = card;

    PostView {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        author: author(post_author),
        category: post_category.map(category),
        location: post_location.map(location),
        image: post.image,
        is_published: post.is_published,
        comment_count,
    }
}

pub fn comment(card: CommentCard) -> CommentView {
    CommentView {
        id: card.comment.id,
        text: card.comment.text,
        created_at: card.comment.created_at,
        author: author(card.author),
    }
}

pub fn profile(user: &User, is_owner: bool) -> ProfileView {
    ProfileView {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: is_owner.then(|| user.email.clone()),
        date_joined: user.created_at,
    }
}

pub fn page<T>(page: Page<T>) -> PageView<T> {
    PageView::new(
        page.items,
        page.info.number,
        page.info.num_pages,
        page.info.per_page,
        page.info.total,
    )
}

pub fn category_choices(categories: Vec<Category>) -> Vec<ChoiceView> {
    categories
        .into_iter()
        .map(|c| ChoiceView {
            id: c.id,
            label: c.title,
        })
        .collect()
}

pub fn location_choices(locations: Vec<Location>) -> Vec<ChoiceView> {
    locations
        .into_iter()
        .map(|l| ChoiceView {
            id: l.id,
            label: l.name,
        })
        .collect()
}
